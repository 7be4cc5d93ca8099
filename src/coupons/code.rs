//! Coupon Codes

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum length of a coupon code.
pub const MAX_CODE_LEN: usize = 64;

/// Reasons a string is not a usable coupon code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CouponCodeError {
    #[error("coupon code is empty")]
    Empty,

    #[error("coupon code is longer than {MAX_CODE_LEN} characters")]
    TooLong,

    #[error("coupon code may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// A normalised coupon code. Codes compare case-insensitively, so the
/// canonical form is trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CouponCode(String);

impl CouponCode {
    /// Parse and normalise a user-supplied code.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponCodeError`] if the trimmed code is empty, too long or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, CouponCodeError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CouponCodeError::Empty);
        }

        if trimmed.chars().count() > MAX_CODE_LEN {
            return Err(CouponCodeError::TooLong);
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CouponCodeError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The upper-cased code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CouponCode {
    type Err = CouponCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CouponCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CouponCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

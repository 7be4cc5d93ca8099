//! Coupons

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

mod code;
mod evaluation;

pub use code::{CouponCode, CouponCodeError, MAX_CODE_LEN};
pub use evaluation::{EvaluatedCoupon, evaluate};

/// Coupon UUID
pub type CouponUuid = TypedUuid<Coupon>;

/// How a coupon discounts a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponDiscount {
    /// Percentage of the subtotal, optionally capped.
    #[serde(rename_all = "camelCase")]
    Percentage {
        /// Percent off, e.g. `12.5`.
        percent: Decimal,
        /// Largest discount granted.
        max_discount: Option<u64>,
    },

    /// Flat amount off, never more than the subtotal.
    #[serde(rename_all = "camelCase")]
    Fixed {
        /// Amount off.
        amount: u64,
    },
}

impl CouponDiscount {
    /// Storage tag for this kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::Fixed { .. } => "fixed",
        }
    }
}

/// A coupon rule set as read from the coupon store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Coupon id.
    pub uuid: CouponUuid,
    /// Normalised code.
    pub code: CouponCode,
    /// How the discount is computed.
    #[serde(flatten)]
    pub discount: CouponDiscount,
    /// Smallest subtotal the coupon applies to.
    pub min_purchase: Option<u64>,
    /// Start of the validity window.
    pub valid_from: Timestamp,
    /// End of the validity window.
    pub valid_to: Timestamp,
    /// Orders the coupon may be used on.
    pub usage_limit: Option<u32>,
    /// Orders it has been used on.
    pub usage_count: u32,
    /// Switched on by staff.
    pub active: bool,
}

impl Coupon {
    /// Whether the usage cap, if any, has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Check that the coupon record itself is coherent.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Misconfigured`] when the validity window is
    /// inverted or the discount value is out of range.
    pub fn check_rules(&self) -> Result<(), CouponError> {
        if self.valid_from > self.valid_to {
            return Err(CouponError::Misconfigured);
        }

        match &self.discount {
            CouponDiscount::Percentage { percent, .. }
                if *percent <= Decimal::ZERO || *percent > Decimal::ONE_HUNDRED =>
            {
                Err(CouponError::Misconfigured)
            }
            CouponDiscount::Fixed { amount: 0 } => Err(CouponError::Misconfigured),
            _ => Ok(()),
        }
    }
}

/// Reasons a coupon does not apply.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon carries the code.
    #[error("coupon not found")]
    NotFound,

    /// Switched off by staff.
    #[error("coupon is not active")]
    Inactive,

    /// Before `valid_from`.
    #[error("coupon is not valid yet")]
    NotYetValid,

    /// After `valid_to`.
    #[error("coupon has expired")]
    Expired,

    /// Every usage slot has been taken.
    #[error("coupon usage limit reached")]
    UsageExceeded,

    /// Subtotal is below the coupon's minimum purchase.
    #[error("order subtotal is below the coupon minimum of {min_purchase}")]
    BelowMinPurchase { min_purchase: u64 },

    /// Stored values cannot produce a discount.
    #[error("coupon is misconfigured")]
    Misconfigured,
}

impl CouponError {
    /// Machine-readable reason code.
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Inactive => "INACTIVE",
            Self::NotYetValid => "NOT_YET_VALID",
            Self::Expired => "EXPIRED",
            Self::UsageExceeded => "USAGE_EXCEEDED",
            Self::BelowMinPurchase { .. } => "BELOW_MIN_PURCHASE",
            Self::Misconfigured => "MISCONFIGURED",
        }
    }
}

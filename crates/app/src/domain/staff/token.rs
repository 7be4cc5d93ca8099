//! Staff token formatting and hashing.
//!
//! Tokens look like `bz_<64 hex chars>`. Only the SHA-256 digest of the full
//! token is ever stored.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const STAFF_TOKEN_PREFIX: &str = "bz_";

/// Number of random bytes in a token.
pub const STAFF_TOKEN_SECRET_BYTES: usize = 32;

const STAFF_TOKEN_HEX_CHARS: usize = STAFF_TOKEN_SECRET_BYTES * 2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StaffTokenError {
    #[error("staff token format is invalid")]
    InvalidFormat,
}

#[must_use]
pub fn generate_staff_token() -> String {
    let mut secret = [0_u8; STAFF_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    format!("{STAFF_TOKEN_PREFIX}{}", encode_hex(&secret))
}

/// Check the token's shape before it is hashed and looked up.
///
/// # Errors
///
/// Returns [`StaffTokenError::InvalidFormat`] unless the token is the prefix
/// followed by exactly 64 lowercase hex characters.
pub fn parse_staff_token(token: &str) -> Result<&str, StaffTokenError> {
    let secret = token
        .strip_prefix(STAFF_TOKEN_PREFIX)
        .ok_or(StaffTokenError::InvalidFormat)?;

    let well_formed = secret.len() == STAFF_TOKEN_HEX_CHARS
        && secret
            .bytes()
            .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte));

    if well_formed {
        Ok(token)
    } else {
        Err(StaffTokenError::InvalidFormat)
    }
}

/// Storage verifier for a token.
#[must_use]
pub fn hash_staff_token(token: &str) -> String {
    encode_hex(&Sha256::digest(token.as_bytes()))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

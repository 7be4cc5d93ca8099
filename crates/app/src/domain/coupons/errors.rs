//! Coupons service errors.

use bazaar::coupons::CouponError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon code already exists")]
    AlreadyExists,

    #[error("coupon not found")]
    NotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("coupon cannot be applied: {0}")]
    Rejected(#[source] CouponError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CouponsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation | ErrorKind::ForeignKeyViolation) => Self::InvalidData,
            _ if matches!(error, Error::ColumnDecode { .. }) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<CouponError> for CouponsServiceError {
    fn from(error: CouponError) -> Self {
        Self::Rejected(error)
    }
}

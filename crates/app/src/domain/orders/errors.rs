//! Orders service errors.

use bazaar::{checkout::AssemblyError, customers::ValidationErrors, orders::TransitionError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// `serialization_failure` and `deadlock_detected`.
const CONTENTION_SQLSTATES: [&str; 2] = ["40001", "40P01"];

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("invalid checkout: {0}")]
    Invalid(#[source] ValidationErrors),

    #[error("order rejected: {0}")]
    Rejected(#[source] AssemblyError),

    #[error("coupon usage limit reached")]
    CouponExhausted,

    #[error(transparent)]
    IllegalTransition(TransitionError),

    #[error("order was changed concurrently")]
    StatusConflict,

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("order not found")]
    NotFound,

    #[error("order already exists")]
    AlreadyExists,

    #[error("order references an unknown product, variant or coupon")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("transaction aborted by a concurrent checkout")]
    Contention(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    /// Machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) | Self::InvalidData | Self::MissingRequiredData => "INVALID_INPUT",
            Self::Rejected(error) => error.reason_code(),
            Self::CouponExhausted => "COUPON_EXHAUSTED",
            Self::IllegalTransition(error) => error.reason_code(),
            Self::StatusConflict => "STATUS_CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidReference => "PRODUCT_UNAVAILABLE",
            Self::AlreadyExists
            | Self::OrderNumberExhausted
            | Self::Contention(_)
            | Self::Sql(_) => "INTERNAL",
        }
    }

    /// Whether re-running assembly against fresh state may succeed.
    ///
    /// Coupon exhaustion is final: the usage slot is gone.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Rejected(AssemblyError::InsufficientStock { .. }) | Self::Contention(_)
        )
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if let Some(db_error) = error.as_database_error()
            && db_error
                .code()
                .is_some_and(|code| CONTENTION_SQLSTATES.contains(&&*code))
        {
            return Self::Contention(error);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ if matches!(error, Error::ColumnDecode { .. }) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<AssemblyError> for OrdersServiceError {
    fn from(error: AssemblyError) -> Self {
        Self::Rejected(error)
    }
}

impl From<TransitionError> for OrdersServiceError {
    fn from(error: TransitionError) -> Self {
        Self::IllegalTransition(error)
    }
}

impl From<ValidationErrors> for OrdersServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use bazaar::{
        catalog::{LineKey, ProductUuid},
        coupons::CouponError,
        orders::OrderStatus,
    };

    use super::*;

    #[test]
    fn only_stock_races_and_contention_are_retryable() {
        let line = LineKey::product(ProductUuid::new());

        let short = OrdersServiceError::Rejected(AssemblyError::InsufficientStock {
            line,
            requested: 2,
            available: 1,
        });

        assert!(short.is_retryable(), "stock race should be retryable");
        assert!(
            !OrdersServiceError::CouponExhausted.is_retryable(),
            "coupon exhaustion is final"
        );
        assert!(
            !OrdersServiceError::Rejected(AssemblyError::ProductUnavailable { line }).is_retryable(),
            "unavailable product is final"
        );
    }

    #[test]
    fn reason_codes_follow_the_rejection() {
        let coupon = OrdersServiceError::Rejected(AssemblyError::CouponInvalid(CouponError::Expired));
        let transition = OrdersServiceError::from(TransitionError::Order {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        });

        assert_eq!(coupon.reason_code(), "COUPON_INVALID");
        assert_eq!(OrdersServiceError::CouponExhausted.reason_code(), "COUPON_EXHAUSTED");
        assert_eq!(transition.reason_code(), "ILLEGAL_TRANSITION");
        assert_eq!(OrdersServiceError::from(Error::RowNotFound).reason_code(), "NOT_FOUND");
    }
}

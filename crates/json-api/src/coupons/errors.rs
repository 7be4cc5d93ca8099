//! Coupon Errors

use bazaar_app::domain::coupons::CouponsServiceError;
use salvo::http::{StatusCode, StatusError};
use tracing::error;

use crate::errors::{ApiError, ErrorResponse, INVALID_INPUT};

const COUPON_INVALID: &str = "COUPON_INVALID";

pub(crate) fn into_api_error(error: CouponsServiceError) -> ApiError {
    match error {
        CouponsServiceError::Rejected(reason) => ApiError::rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new(COUPON_INVALID, reason.to_string()).with_reason(reason.reason_code()),
        ),
        CouponsServiceError::NotFound => ApiError::rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new(COUPON_INVALID, error.to_string()).with_reason("NOT_FOUND"),
        ),
        CouponsServiceError::InvalidData | CouponsServiceError::MissingRequiredData => {
            ApiError::rejected(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(INVALID_INPUT, error.to_string()),
            )
        }
        CouponsServiceError::AlreadyExists | CouponsServiceError::Sql(_) => {
            error!("coupon request failed: {error}");

            StatusError::internal_server_error().into()
        }
    }
}

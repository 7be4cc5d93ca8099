//! Order Errors

use bazaar::checkout::AssemblyError;
use bazaar_app::domain::orders::OrdersServiceError;
use salvo::http::{StatusCode, StatusError};
use tracing::error;

use crate::errors::{ApiError, ErrorResponse};

pub(crate) fn into_api_error(error: OrdersServiceError) -> ApiError {
    let code = error.reason_code();

    match error {
        OrdersServiceError::Invalid(errors) => {
            ApiError::rejected(StatusCode::BAD_REQUEST, ErrorResponse::from(&errors))
        }
        OrdersServiceError::Rejected(rejection) => rejected(&rejection),
        OrdersServiceError::CouponExhausted
        | OrdersServiceError::IllegalTransition(_)
        | OrdersServiceError::StatusConflict
        | OrdersServiceError::InvalidReference => ApiError::rejected(
            StatusCode::CONFLICT,
            ErrorResponse::new(code, error.to_string()),
        ),
        OrdersServiceError::InvalidData | OrdersServiceError::MissingRequiredData => {
            ApiError::rejected(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(code, error.to_string()),
            )
        }
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found").into(),
        OrdersServiceError::AlreadyExists
        | OrdersServiceError::OrderNumberExhausted
        | OrdersServiceError::Contention(_)
        | OrdersServiceError::Sql(_) => {
            error!("order request failed: {error}");

            StatusError::internal_server_error().into()
        }
    }
}

/// Plain status for read-only endpoints, which have no rejection body.
pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match into_api_error(error) {
        ApiError::Status(status) => status,
        ApiError::Rejected { status, body } => StatusError::from_code(status)
            .unwrap_or_else(StatusError::internal_server_error)
            .brief(body.message),
    }
}

fn rejected(rejection: &AssemblyError) -> ApiError {
    let body = ErrorResponse::new(rejection.reason_code(), rejection.to_string());

    match rejection {
        AssemblyError::ProductUnavailable { line } => ApiError::rejected(
            StatusCode::CONFLICT,
            ErrorResponse {
                line: Some((*line).into()),
                ..body
            },
        ),
        AssemblyError::InsufficientStock {
            line, available, ..
        } => ApiError::rejected(
            StatusCode::CONFLICT,
            ErrorResponse {
                line: Some((*line).into()),
                available: Some(*available),
                ..body
            },
        ),
        AssemblyError::CouponInvalid(reason) => ApiError::rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            body.with_reason(reason.reason_code()),
        ),
        AssemblyError::AmountOverflow => ApiError::rejected(StatusCode::BAD_REQUEST, body),
    }
}

//! Machine-readable error bodies.
//!
//! Checkout, coupon and status-change failures carry a reason code the
//! storefront branches on, so they are rendered as [`ErrorResponse`] instead
//! of a bare [`StatusError`].

use bazaar::{catalog::LineKey, customers::ValidationErrors};
use salvo::{oapi::ToSchema, prelude::*, writing::Scribe};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const INVALID_INPUT: &str = "INVALID_INPUT";

/// Failing input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct FieldErrorResponse {
    /// Dotted path of the field, e.g. `customer.phone`
    pub field: String,

    pub message: String,
}

/// Order line a rejection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineResponse {
    pub product_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<Uuid>,
}

impl From<LineKey> for LineResponse {
    fn from(line: LineKey) -> Self {
        Self {
            product_id: line.product.into_uuid(),
            variant_id: line.variant.map(Into::into),
        }
    }
}

/// Error Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    /// Machine-readable error code, e.g. `INSUFFICIENT_STOCK`
    pub code: String,

    /// Finer-grained reason, e.g. `EXPIRED` for `COUPON_INVALID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineResponse>,

    /// Units still in stock for `line`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldErrorResponse>>,
}

impl ErrorResponse {
    pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            reason: None,
            message: message.into(),
            line: None,
            available: None,
            fields: None,
        }
    }

    pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();

        Self {
            fields: Some(vec![FieldErrorResponse {
                field: field.to_string(),
                message: message.clone(),
            }]),
            ..Self::new(INVALID_INPUT, message)
        }
    }

    #[must_use]
    pub(crate) fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

impl From<&ValidationErrors> for ErrorResponse {
    fn from(errors: &ValidationErrors) -> Self {
        Self {
            fields: Some(
                errors
                    .errors
                    .iter()
                    .map(|error| FieldErrorResponse {
                        field: error.field.clone(),
                        message: error.message.clone(),
                    })
                    .collect(),
            ),
            ..Self::new(INVALID_INPUT, errors.to_string())
        }
    }
}

/// A failed request: either a structured rejection or a plain status.
#[derive(Debug)]
pub(crate) enum ApiError {
    Rejected {
        status: StatusCode,
        body: ErrorResponse,
    },
    Status(StatusError),
}

impl ApiError {
    pub(crate) fn rejected(status: StatusCode, body: ErrorResponse) -> Self {
        Self::Rejected { status, body }
    }

    /// Reason code of a structured rejection.
    pub(crate) fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => Some(&body.code),
            Self::Status(_) => None,
        }
    }
}

impl From<StatusError> for ApiError {
    fn from(error: StatusError) -> Self {
        Self::Status(error)
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        match self {
            Self::Rejected { status, body } => {
                res.status_code(status);
                res.render(Json(body));
            }
            Self::Status(error) => res.render(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use bazaar::catalog::{ProductUuid, VariantUuid};
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn absent_details_are_omitted() -> TestResult {
        let body = serde_json::to_value(ErrorResponse::new("COUPON_EXHAUSTED", "gone"))?;

        assert_eq!(body, json!({ "code": "COUPON_EXHAUSTED", "message": "gone" }));

        Ok(())
    }

    #[test]
    fn variant_lines_carry_both_ids() -> TestResult {
        let product = ProductUuid::new();
        let variant = VariantUuid::new();

        let body = serde_json::to_value(LineResponse::from(LineKey::variant(product, variant)))?;

        assert_eq!(
            body,
            json!({ "productId": product.into_uuid(), "variantId": variant.into_uuid() })
        );

        Ok(())
    }

    #[test]
    fn validation_errors_list_every_field() {
        let mut errors = ValidationErrors::new();

        errors.push("customer.phone", "must be a Bangladeshi mobile number");
        errors.push("items", "must not be empty");

        let body = ErrorResponse::from(&errors);
        let fields: Vec<&str> = body
            .fields
            .iter()
            .flatten()
            .map(|field| field.field.as_str())
            .collect();

        assert_eq!(body.code, INVALID_INPUT);
        assert_eq!(fields, ["customer.phone", "items"]);
    }
}

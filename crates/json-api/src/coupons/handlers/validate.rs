//! Validate Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    coupons::{
        errors::into_api_error,
        models::{ValidateCouponRequest, ValidateCouponResponse},
    },
    errors::{ApiError, ErrorResponse},
    extensions::*,
    state::State,
};

/// Validate Coupon Handler
///
/// Evaluates a coupon against a subtotal. Nothing is reserved: the coupon is
/// charged only when an order using it commits.
#[endpoint(
    tags("coupons"),
    summary = "Validate Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon applies", body = ValidateCouponResponse),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon does not apply", body = ErrorResponse),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ValidateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) {
    match validate_coupon(json.into_inner(), depot).await {
        Ok(response) => res.render(Json(response)),
        Err(error) => res.render(error),
    }
}

async fn validate_coupon(
    request: ValidateCouponRequest,
    depot: &Depot,
) -> Result<ValidateCouponResponse, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let evaluated = state
        .app
        .coupons
        .validate_coupon(request.code, request.subtotal)
        .await
        .map_err(into_api_error)?;

    Ok(ValidateCouponResponse {
        discount: evaluated.discount,
        coupon: evaluated.coupon.into(),
    })
}

#[cfg(test)]
mod tests {
    use bazaar::coupons::{
        Coupon, CouponCode, CouponDiscount, CouponError, CouponUuid, EvaluatedCoupon,
    };
    use bazaar_app::domain::coupons::{CouponsServiceError, MockCouponsService};
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{coupons::models::CouponKindBody, test_helpers::coupons_service};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(
            coupons,
            Router::with_path("coupons/validate").post(handler),
        )
    }

    fn flat_coupon() -> TestResult<Coupon> {
        Ok(Coupon {
            uuid: CouponUuid::new(),
            code: CouponCode::parse("EID200")?,
            discount: CouponDiscount::Fixed { amount: 200 },
            min_purchase: None,
            valid_from: Timestamp::UNIX_EPOCH,
            valid_to: Timestamp::MAX,
            usage_limit: None,
            usage_count: 0,
            active: true,
        })
    }

    #[tokio::test]
    async fn test_validate_returns_discount_and_coupon() -> TestResult {
        let coupon = flat_coupon()?;

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_validate_coupon()
            .once()
            .withf(|code, subtotal| code == "eid200" && *subtotal == 1500)
            .return_once(move |_, _| {
                Ok(EvaluatedCoupon {
                    coupon,
                    discount: 200,
                })
            });

        let mut res = TestClient::post("http://example.com/coupons/validate")
            .json(&json!({ "code": "eid200", "subtotal": 1500 }))
            .send(&make_service(coupons))
            .await;

        let body: ValidateCouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.discount, 200);
        assert_eq!(body.coupon.code, "EID200");
        assert_eq!(body.coupon.kind, CouponKindBody::Fixed);
        assert_eq!(body.coupon.amount, Some(200));

        Ok(())
    }

    #[tokio::test]
    async fn test_below_minimum_returns_422_with_reason() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_validate_coupon().once().return_once(|_, _| {
            Err(CouponsServiceError::Rejected(CouponError::BelowMinPurchase {
                min_purchase: 1000,
            }))
        });

        let mut res = TestClient::post("http://example.com/coupons/validate")
            .json(&json!({ "code": "WELCOME10", "subtotal": 900 }))
            .send(&make_service(coupons))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(body.code, "COUPON_INVALID");
        assert_eq!(body.reason.as_deref(), Some("BELOW_MIN_PURCHASE"));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_coupon_returns_422_not_found() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_validate_coupon()
            .once()
            .return_once(|_, _| Err(CouponsServiceError::Rejected(CouponError::NotFound)));

        let mut res = TestClient::post("http://example.com/coupons/validate")
            .json(&json!({ "code": "NOPE", "subtotal": 900 }))
            .send(&make_service(coupons))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(body.reason.as_deref(), Some("NOT_FOUND"));

        Ok(())
    }

    #[tokio::test]
    async fn test_percentage_coupon_reports_percent_as_text() -> TestResult {
        let coupon = Coupon {
            discount: serde_json::from_value::<CouponDiscount>(json!({
                "kind": "PERCENTAGE",
                "percent": "12.50",
                "maxDiscount": 500
            }))?,
            ..flat_coupon()?
        };

        let response = crate::coupons::models::CouponResponse::from(coupon);

        assert_eq!(response.kind, CouponKindBody::Percentage);
        assert_eq!(response.percent.as_deref(), Some("12.5"));
        assert_eq!(response.max_discount, Some(500));
        assert_eq!(response.amount, None);

        Ok(())
    }
}

//! Coupon request and response bodies.

use bazaar::coupons::{Coupon, CouponDiscount};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Validate Coupon Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidateCouponRequest {
    /// Coupon code, matched ignoring case
    pub code: String,

    /// Cart subtotal the coupon would apply to
    pub subtotal: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum CouponKindBody {
    Percentage,
    Fixed,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CouponResponse {
    pub code: String,
    pub kind: CouponKindBody,

    /// Percentage off, e.g. `"12.5"`, for percentage coupons
    #[serde(default)]
    pub percent: Option<String>,

    /// Cap on a percentage discount
    #[serde(default)]
    pub max_discount: Option<u64>,

    /// Amount off, for fixed coupons
    #[serde(default)]
    pub amount: Option<u64>,

    #[serde(default)]
    pub min_purchase: Option<u64>,

    pub valid_from: String,
    pub valid_to: String,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        let (kind, percent, max_discount, amount) = match coupon.discount {
            CouponDiscount::Percentage {
                percent,
                max_discount,
            } => (
                CouponKindBody::Percentage,
                Some(percent.normalize().to_string()),
                max_discount,
                None,
            ),
            CouponDiscount::Fixed { amount } => (CouponKindBody::Fixed, None, None, Some(amount)),
        };

        CouponResponse {
            code: coupon.code.to_string(),
            kind,
            percent,
            max_discount,
            amount,
            min_purchase: coupon.min_purchase,
            valid_from: coupon.valid_from.to_string(),
            valid_to: coupon.valid_to.to_string(),
        }
    }
}

/// Validate Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidateCouponResponse {
    /// Discount the coupon would grant on the given subtotal
    pub discount: u64,

    pub coupon: CouponResponse,
}

//! Coupon Data

use bazaar::coupons::{CouponCode, CouponDiscount, CouponUuid};
use jiff::Timestamp;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: CouponCode,
    pub discount: CouponDiscount,
    pub min_purchase: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    pub usage_limit: Option<u32>,
    pub active: bool,
}

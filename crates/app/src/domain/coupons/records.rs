//! Coupon Records

use bazaar::coupons::{Coupon, CouponCode, CouponDiscount, CouponUuid};
use jiff::Timestamp;

/// Coupon Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: CouponCode,
    pub discount: CouponDiscount,
    pub min_purchase: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CouponRecord> for Coupon {
    fn from(record: CouponRecord) -> Self {
        Self {
            uuid: record.uuid,
            code: record.code,
            discount: record.discount,
            min_purchase: record.min_purchase,
            valid_from: record.valid_from,
            valid_to: record.valid_to,
            usage_limit: record.usage_limit,
            usage_count: record.usage_count,
            active: record.active,
        }
    }
}

//! Coupon Evaluation

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use super::{Coupon, CouponDiscount, CouponError};

/// A coupon that applies to a subtotal, and the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedCoupon {
    /// The coupon as evaluated.
    pub coupon: Coupon,
    /// Discount granted, rounded down.
    pub discount: u64,
}

/// Decide whether `coupon` applies to `subtotal` at `now`, and compute the
/// discount.
///
/// `coupon` is the result of a case-insensitive lookup; `None` means no
/// coupon matched. Evaluation never mutates the coupon; usage is charged only
/// when an order commits. The discount is rounded down and never exceeds the
/// subtotal.
///
/// # Errors
///
/// Returns the first [`CouponError`] that applies, checked in order: missing,
/// inactive, outside its validity window, usage cap reached, below minimum
/// purchase, misconfigured.
pub fn evaluate(
    coupon: Option<&Coupon>,
    subtotal: u64,
    now: Timestamp,
) -> Result<EvaluatedCoupon, CouponError> {
    let coupon = coupon.ok_or(CouponError::NotFound)?;

    if !coupon.active {
        return Err(CouponError::Inactive);
    }

    if now < coupon.valid_from {
        return Err(CouponError::NotYetValid);
    }

    if now > coupon.valid_to {
        return Err(CouponError::Expired);
    }

    if coupon.is_exhausted() {
        return Err(CouponError::UsageExceeded);
    }

    if let Some(min_purchase) = coupon.min_purchase
        && subtotal < min_purchase
    {
        return Err(CouponError::BelowMinPurchase { min_purchase });
    }

    coupon.check_rules()?;

    let discount = match &coupon.discount {
        CouponDiscount::Percentage {
            percent,
            max_discount,
        } => {
            let raw = percentage_of(subtotal, *percent)?;

            max_discount.map_or(raw, |cap| raw.min(cap))
        }
        CouponDiscount::Fixed { amount } => *amount,
    };

    Ok(EvaluatedCoupon {
        coupon: coupon.clone(),
        discount: discount.min(subtotal),
    })
}

fn percentage_of(subtotal: u64, percent: Decimal) -> Result<u64, CouponError> {
    Decimal::from(subtotal)
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|amount| amount.round_dp_with_strategy(0, RoundingStrategy::ToZero))
        .and_then(|amount| amount.to_u64())
        .ok_or(CouponError::Misconfigured)
}

//! Orders

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{LineKey, ProductUuid, VariantUuid},
    coupons::{CouponCode, CouponUuid, EvaluatedCoupon},
    customers::{Customer, Payment, PaymentMethod},
    uuids::TypedUuid,
};

mod number;
mod status;

pub use number::{InvalidOrderNumber, OrderNumber};
pub use status::{OrderStatus, PaymentStatus, TransitionError};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Maximum length of a client-generated idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 100;

/// Why an idempotency key was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("idempotency key must be 1 to {MAX_IDEMPOTENCY_KEY_LEN} visible characters")]
pub struct InvalidIdempotencyKey;

/// Client-generated token that deduplicates repeated submissions of one
/// checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// # Errors
    ///
    /// Returns [`InvalidIdempotencyKey`] when the trimmed key is empty, too
    /// long, or contains control characters.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdempotencyKey> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if len == 0 || len > MAX_IDEMPOTENCY_KEY_LEN || trimmed.chars().any(char::is_control) {
            return Err(InvalidIdempotencyKey);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The trimmed key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A priced line, frozen at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    /// Product and variant the line draws on.
    pub key: LineKey,
    /// Name frozen at assembly.
    pub name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Authoritative unit price.
    pub unit_price: u64,
    /// `unit_price * quantity`.
    pub line_total: u64,
}

/// The coupon charged to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    /// Coupon id.
    pub uuid: CouponUuid,
    /// Normalised code.
    pub code: CouponCode,
    /// Amount taken off the subtotal.
    pub discount: u64,
}

impl From<EvaluatedCoupon> for AppliedCoupon {
    fn from(evaluated: EvaluatedCoupon) -> Self {
        Self {
            uuid: evaluated.coupon.uuid,
            code: evaluated.coupon.code,
            discount: evaluated.discount,
        }
    }
}

/// A fully priced order that has not been committed.
///
/// Built only by [`crate::checkout::assemble`], so `total == subtotal -
/// discount` and `subtotal` is the sum of the line totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    order_number: OrderNumber,
    customer: Customer,
    payment: Payment,
    user: Option<Uuid>,
    items: Vec<DraftItem>,
    subtotal: u64,
    coupon: Option<AppliedCoupon>,
    total: u64,
    idempotency_key: Option<IdempotencyKey>,
    created_at: Timestamp,
}

/// Everything needed to build an [`OrderDraft`]; totals are derived.
#[derive(Debug)]
pub(crate) struct DraftParts {
    pub order_number: OrderNumber,
    pub customer: Customer,
    pub payment: Payment,
    pub user: Option<Uuid>,
    pub items: Vec<DraftItem>,
    pub subtotal: u64,
    pub coupon: Option<AppliedCoupon>,
    pub idempotency_key: Option<IdempotencyKey>,
    pub created_at: Timestamp,
}

impl OrderDraft {
    /// Returns `None` when the discount exceeds the subtotal.
    pub(crate) fn new(parts: DraftParts) -> Option<Self> {
        let discount = parts.coupon.as_ref().map_or(0, |coupon| coupon.discount);
        let total = parts.subtotal.checked_sub(discount)?;

        Some(Self {
            order_number: parts.order_number,
            customer: parts.customer,
            payment: parts.payment,
            user: parts.user,
            items: parts.items,
            subtotal: parts.subtotal,
            coupon: parts.coupon,
            total,
            idempotency_key: parts.idempotency_key,
            created_at: parts.created_at,
        })
    }

    /// Replace the order number, e.g. after a storage collision.
    #[must_use]
    pub fn with_order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = order_number;
        self
    }

    /// Customer-facing order number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Validated contact details.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Validated payment.
    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    /// Signed-in account placing the order.
    pub fn user(&self) -> Option<Uuid> {
        self.user
    }

    /// Priced lines.
    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    /// Sum of the line totals.
    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    /// Coupon discount, zero without a coupon.
    pub fn discount(&self) -> u64 {
        self.coupon.as_ref().map_or(0, |coupon| coupon.discount)
    }

    /// `subtotal - discount`.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Applied coupon, if any.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Client key for safe resubmission.
    pub fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        self.idempotency_key.as_ref()
    }

    /// Assembly time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Stock to take per line, in the order rows must be locked: sorted by
    /// product then variant.
    pub fn stock_decrements(&self) -> Vec<(LineKey, u32)> {
        let mut decrements: Vec<_> = self
            .items
            .iter()
            .map(|item| (item.key, item.quantity))
            .collect();

        decrements.sort_unstable_by_key(|(key, _)| *key);

        decrements
    }
}

/// bKash details recorded with an order. Never verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    /// Paying bKash account.
    pub bkash_number: String,
    /// bKash transaction id.
    pub bkash_trx_id: String,
}

impl PaymentReference {
    /// The reference for a bKash payment; `None` for cash on delivery.
    pub fn from_payment(payment: &Payment) -> Option<Self> {
        match payment {
            Payment::CashOnDelivery => None,
            Payment::Bkash {
                account_number,
                transaction_id,
            } => Some(Self {
                bkash_number: account_number.to_string(),
                bkash_trx_id: transaction_id.clone(),
            }),
        }
    }
}

/// A committed order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Ordered product.
    pub product_uuid: ProductUuid,
    /// Ordered variant, if any.
    pub variant_uuid: Option<VariantUuid>,
    /// Name at the time of ordering.
    pub name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price charged.
    pub unit_price: u64,
    /// `unit_price * quantity`.
    pub line_total: u64,
}

/// A committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id.
    pub uuid: OrderUuid,
    /// Customer-facing order number.
    pub order_number: OrderNumber,
    /// Recipient name.
    pub customer_name: String,
    /// Normalised mobile number.
    pub customer_phone: String,
    /// Delivery address.
    pub customer_address: String,
    /// Email, if given.
    pub customer_email: Option<String>,
    /// Signed-in account that placed the order.
    pub user_uuid: Option<Uuid>,
    /// Declared payment method.
    pub payment_method: PaymentMethod,
    /// bKash details for bKash orders.
    pub payment_reference: Option<PaymentReference>,
    /// Lines in insertion order.
    pub items: Vec<OrderItem>,
    /// Sum of the line totals.
    pub subtotal: u64,
    /// Coupon discount.
    pub discount: u64,
    /// `subtotal - discount`.
    pub total: u64,
    /// Code of the applied coupon.
    pub coupon_code: Option<String>,
    /// Fulfilment state.
    pub order_status: OrderStatus,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// When the order was placed.
    pub created_at: Timestamp,
    /// Last status change.
    pub updated_at: Timestamp,
}

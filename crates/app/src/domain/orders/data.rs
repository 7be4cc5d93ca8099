//! Orders Data

use bazaar::orders::{OrderNumber, OrderStatus, OrderUuid, PaymentStatus};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::orders::records::OrderRecord;

/// Result of a successful (or replayed) order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub total: u64,

    /// The idempotency key had already produced this order.
    pub replayed: bool,
}

impl PlacedOrder {
    pub(crate) fn created(record: &OrderRecord) -> Self {
        Self {
            uuid: record.uuid,
            order_number: record.order_number.clone(),
            total: record.total,
            replayed: false,
        }
    }

    pub(crate) fn replayed(record: &OrderRecord) -> Self {
        Self {
            replayed: true,
            ..Self::created(record)
        }
    }
}

/// Staff edit of an order's statuses. Absent fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default)]
    pub order_status: Option<OrderStatus>,

    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl StatusUpdate {
    pub const fn is_empty(&self) -> bool {
        self.order_status.is_none() && self.payment_status.is_none()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("limit must be between 1 and {}", Page::MAX_LIMIT)]
pub struct InvalidPage;

/// A window over the most recent orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// # Errors
    ///
    /// Returns [`InvalidPage`] when `limit` is zero or above [`Page::MAX_LIMIT`].
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Result<Self, InvalidPage> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);

        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(InvalidPage);
        }

        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

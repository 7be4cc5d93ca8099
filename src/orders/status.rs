//! Order and payment status transitions

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, awaiting staff confirmation.
    Pending,
    /// Accepted by staff.
    Confirmed,
    /// Being packed.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer. Terminal.
    Delivered,
    /// Abandoned before delivery. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in graph order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the storage representation.
    pub fn from_storage(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Delivered and cancelled orders never change again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether staff may move an order from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (
                    Self::Pending | Self::Confirmed | Self::Processing | Self::Shipped,
                    Self::Cancelled
                )
        )
    }

    /// Apply a transition. Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Order`] for a move outside the transition
    /// graph.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self == next || self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::Order {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Not yet settled.
    Pending,
    /// Settled. Terminal.
    Paid,
    /// Settlement failed. Terminal.
    Failed,
}

impl PaymentStatus {
    /// Every status.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Paid, Self::Failed];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }

    /// Parse the storage representation.
    pub fn from_storage(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Apply a transition. Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Payment`] unless moving out of `Pending`.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self == next || self == Self::Pending {
            Ok(next)
        } else {
            Err(TransitionError::Payment {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status change outside the allowed transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order status cannot move from {from} to {to}")]
    Order { from: OrderStatus, to: OrderStatus },

    #[error("payment status cannot move from {from} to {to}")]
    Payment {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl TransitionError {
    /// Machine-readable reason for API clients.
    pub const fn reason_code(&self) -> &'static str {
        "ILLEGAL_TRANSITION"
    }
}

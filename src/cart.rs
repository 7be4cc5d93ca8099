//! Cart
//!
//! Per-session line collection owned by the caller. Unit prices on cart lines
//! are display snapshots only; checkout re-prices every line from the catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{LineKey, ProductUuid, VariantUuid},
    checkout::LineRequest,
};

/// Errors that can occur when mutating a cart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be at least one; use [`Cart::remove_item`] to delete.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Merging would push a line quantity past `u32::MAX`.
    #[error("quantity for {0} is too large")]
    QuantityOverflow(LineKey),
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product being bought.
    pub product_uuid: ProductUuid,
    /// Selected variant, if the product has one.
    pub variant_uuid: Option<VariantUuid>,
    /// Always at least one.
    pub quantity: u32,
    /// Price shown when the line was added. Never used for the order.
    pub unit_price: u64,
    /// Product name shown in the cart.
    pub display_name: String,
    /// Image URL shown in the cart.
    pub image: Option<String>,
}

impl CartLine {
    /// Identity of this line.
    pub const fn key(&self) -> LineKey {
        LineKey {
            product: self.product_uuid,
            variant: self.variant_uuid,
        }
    }
}

/// Ordered collection of cart lines, unique by [`LineKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a line, merging into an existing line with the same key.
    ///
    /// When merging, the incoming price and display fields are ignored; the
    /// quantity is added to the existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::QuantityOverflow`] if the merged quantity does not fit.
    pub fn add_item(&mut self, line: CartLine) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let key = line.key();

        match self.lines.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CartError::QuantityOverflow(key))?;
            }
            None => self.lines.push(line),
        }

        Ok(())
    }

    /// Set the quantity of an existing line. No-op if the line is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero.
    pub fn update_quantity(&mut self, key: LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.key() == key) {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Remove a line, returning whether one was removed.
    pub fn remove_item(&mut self, key: LineKey) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.key() != key);

        self.lines.len() != before
    }

    /// Display total of the snapshot prices. Saturates rather than overflows;
    /// authoritative totals are computed at checkout.
    pub fn total(&self) -> u64 {
        self.lines.iter().fold(0_u64, |total, line| {
            total.saturating_add(line.unit_price.saturating_mul(u64::from(line.quantity)))
        })
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The id/variant/quantity triples submitted at checkout. Prices are not
    /// carried.
    pub fn to_line_requests(&self) -> Vec<LineRequest> {
        self.lines
            .iter()
            .map(|line| LineRequest {
                product: line.product_uuid,
                variant: line.variant_uuid,
                quantity: line.quantity,
            })
            .collect()
    }
}

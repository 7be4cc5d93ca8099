//! Catalog Data

use bazaar::catalog::{ProductUuid, VariantUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub active: bool,
}

/// New Variant Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub uuid: VariantUuid,
    pub product: ProductUuid,
    pub name: String,

    /// Overrides the product price when set.
    pub price: Option<u64>,
    pub stock: u32,
    pub active: bool,
}

/// Product Availability Update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityUpdate {
    pub stock: u32,
    pub active: bool,
}

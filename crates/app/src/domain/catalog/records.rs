//! Catalog Records

use bazaar::catalog::{CatalogProduct, CatalogVariant, ProductUuid, VariantUuid};
use jiff::Timestamp;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Product Variant Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub price: Option<u64>,
    pub stock: u32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRecord> for CatalogProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            price: record.price,
            stock: record.stock,
            active: record.active,
        }
    }
}

impl From<VariantRecord> for CatalogVariant {
    fn from(record: VariantRecord) -> Self {
        Self {
            uuid: record.uuid,
            product: record.product_uuid,
            name: record.name,
            price: record.price,
            stock: record.stock,
            active: record.active,
        }
    }
}

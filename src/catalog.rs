//! Catalog
//!
//! A read-only snapshot of the authoritative product and variant records a
//! checkout touches. The storage layer fills it; the assembler prices and
//! stock-checks against it and never against client-submitted values.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<CatalogProduct>;

/// Product Variant UUID
pub type VariantUuid = TypedUuid<CatalogVariant>;

/// Identity of an order or cart line: a product plus an optional variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    /// Product being bought.
    pub product: ProductUuid,

    /// Selected variant, if the product has one.
    pub variant: Option<VariantUuid>,
}

impl LineKey {
    /// Key for a product without a variant.
    #[must_use]
    pub const fn product(product: ProductUuid) -> Self {
        Self {
            product,
            variant: None,
        }
    }

    /// Key for a specific variant of a product.
    #[must_use]
    pub const fn variant(product: ProductUuid, variant: VariantUuid) -> Self {
        Self {
            product,
            variant: Some(variant),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(variant) => write!(f, "product {} variant {variant}", self.product),
            None => write!(f, "product {}", self.product),
        }
    }
}

/// Authoritative product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Product id.
    pub uuid: ProductUuid,
    /// Display name frozen onto order items.
    pub name: String,
    /// Current unit price.
    pub price: u64,
    /// Units available for variant-less lines.
    pub stock: u32,
    /// Inactive products cannot be ordered.
    pub active: bool,
}

/// Authoritative variant record. A variant price, when set, overrides the
/// product price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogVariant {
    /// Variant id.
    pub uuid: VariantUuid,
    /// Product the variant belongs to.
    pub product: ProductUuid,
    /// Variant label, e.g. a colour or size.
    pub name: String,
    /// Price override.
    pub price: Option<u64>,
    /// Units available of this variant.
    pub stock: u32,
    /// Inactive variants cannot be ordered.
    pub active: bool,
}

/// The price, stock and display name a line resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// Name to freeze onto the order item.
    pub name: String,
    /// Authoritative unit price.
    pub unit_price: u64,
    /// Stock the line draws from.
    pub available: u32,
}

/// Products and variants keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: FxHashMap<ProductUuid, CatalogProduct>,
    variants: FxHashMap<VariantUuid, CatalogVariant>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from fetched records.
    pub fn from_records(
        products: impl IntoIterator<Item = CatalogProduct>,
        variants: impl IntoIterator<Item = CatalogVariant>,
    ) -> Self {
        let mut snapshot = Self::new();

        products
            .into_iter()
            .for_each(|product| snapshot.insert_product(product));

        variants
            .into_iter()
            .for_each(|variant| snapshot.insert_variant(variant));

        snapshot
    }

    /// Insert or replace a product.
    pub fn insert_product(&mut self, product: CatalogProduct) {
        self.products.insert(product.uuid, product);
    }

    /// Insert or replace a variant.
    pub fn insert_variant(&mut self, variant: CatalogVariant) {
        self.variants.insert(variant.uuid, variant);
    }

    /// Look up a product.
    pub fn product(&self, uuid: ProductUuid) -> Option<&CatalogProduct> {
        self.products.get(&uuid)
    }

    /// Look up a variant.
    pub fn variant(&self, uuid: VariantUuid) -> Option<&CatalogVariant> {
        self.variants.get(&uuid)
    }

    /// Resolve a line against the snapshot.
    ///
    /// Returns `None` when the product is missing or inactive, or when a
    /// variant is requested that is missing, inactive, or belongs to another
    /// product. Variant stock is authoritative when a variant is selected.
    pub fn resolve(&self, key: LineKey) -> Option<ResolvedLine> {
        let product = self.product(key.product).filter(|product| product.active)?;

        let Some(variant_uuid) = key.variant else {
            return Some(ResolvedLine {
                name: product.name.clone(),
                unit_price: product.price,
                available: product.stock,
            });
        };

        let variant = self
            .variant(variant_uuid)
            .filter(|variant| variant.active && variant.product == product.uuid)?;

        Some(ResolvedLine {
            name: format!("{} ({})", product.name, variant.name),
            unit_price: variant.price.unwrap_or(product.price),
            available: variant.stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: u64, stock: u32) -> CatalogProduct {
        CatalogProduct {
            uuid: ProductUuid::new(),
            name: "Panjabi".to_string(),
            price,
            stock,
            active: true,
        }
    }

    fn variant(product: ProductUuid, price: Option<u64>, stock: u32) -> CatalogVariant {
        CatalogVariant {
            uuid: VariantUuid::new(),
            product,
            name: "XL".to_string(),
            price,
            stock,
            active: true,
        }
    }

    #[test]
    fn resolves_product_price_and_stock() {
        let product = product(500, 3);
        let key = LineKey::product(product.uuid);
        let snapshot = CatalogSnapshot::from_records([product], []);

        assert_eq!(
            snapshot.resolve(key),
            Some(ResolvedLine {
                name: "Panjabi".to_string(),
                unit_price: 500,
                available: 3,
            })
        );
    }

    #[test]
    fn variant_price_overrides_product_price() {
        let product = product(500, 3);
        let variant = variant(product.uuid, Some(650), 1);
        let key = LineKey::variant(product.uuid, variant.uuid);
        let snapshot = CatalogSnapshot::from_records([product], [variant]);

        let resolved = snapshot.resolve(key);

        assert_eq!(resolved.as_ref().map(|line| line.unit_price), Some(650));
        assert_eq!(resolved.as_ref().map(|line| line.available), Some(1));
        assert_eq!(
            resolved.map(|line| line.name),
            Some("Panjabi (XL)".to_string())
        );
    }

    #[test]
    fn variant_without_price_inherits_product_price() {
        let product = product(500, 3);
        let variant = variant(product.uuid, None, 8);
        let key = LineKey::variant(product.uuid, variant.uuid);
        let snapshot = CatalogSnapshot::from_records([product], [variant]);

        assert_eq!(snapshot.resolve(key).map(|line| line.unit_price), Some(500));
    }

    #[test]
    fn inactive_or_missing_records_do_not_resolve() {
        let mut inactive = product(500, 3);
        inactive.active = false;

        let owner = product(100, 1);
        let foreign_variant = variant(ProductUuid::new(), None, 5);

        let keys = [
            LineKey::product(inactive.uuid),
            LineKey::product(ProductUuid::new()),
            LineKey::variant(owner.uuid, VariantUuid::new()),
            LineKey::variant(owner.uuid, foreign_variant.uuid),
        ];

        let snapshot = CatalogSnapshot::from_records([inactive, owner], [foreign_variant]);

        for key in keys {
            assert!(snapshot.resolve(key).is_none(), "{key} should not resolve");
        }
    }

    #[test]
    fn inactive_variant_does_not_resolve() {
        let product = product(500, 3);
        let mut variant = variant(product.uuid, None, 8);
        variant.active = false;

        let key = LineKey::variant(product.uuid, variant.uuid);
        let snapshot = CatalogSnapshot::from_records([product], [variant]);

        assert!(snapshot.resolve(key).is_none());
    }
}

//! Catalog service.

use async_trait::async_trait;
use bazaar::catalog::{CatalogSnapshot, LineKey, ProductUuid, VariantUuid};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        data::{AvailabilityUpdate, NewProduct, NewVariant},
        errors::CatalogServiceError,
        records::{ProductRecord, VariantRecord},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid),
        err
    )]
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.create_variant",
        skip(self, variant),
        fields(variant_uuid = %variant.uuid, product_uuid = %variant.product),
        err
    )]
    async fn create_variant(&self, variant: NewVariant) -> Result<VariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_variant(&mut tx, variant).await?;

        tx.commit().await?;

        info!(variant_uuid = %created.uuid, "created variant");

        Ok(created)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_variant(&self, variant: VariantUuid) -> Result<VariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let variant = self.repository.get_variant(&mut tx, variant).await?;

        tx.commit().await?;

        Ok(variant)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product_price",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product_price(&mut tx, product, price)
            .await?;

        tx.commit().await?;

        info!(product_uuid = %updated.uuid, price, "updated product price");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product_availability",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product_availability(
        &self,
        product: ProductUuid,
        update: AvailabilityUpdate,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product_availability(&mut tx, product, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn get_snapshot(&self, lines: Vec<LineKey>) -> Result<CatalogSnapshot, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let snapshot = self.repository.fetch_snapshot(&mut tx, &lines).await?;

        tx.commit().await?;

        Ok(snapshot)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Creates a product.
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, CatalogServiceError>;

    /// Creates a variant of an existing product.
    async fn create_variant(&self, variant: NewVariant) -> Result<VariantRecord, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieve a single variant.
    async fn get_variant(&self, variant: VariantUuid) -> Result<VariantRecord, CatalogServiceError>;

    /// Changes the current price of a product. Placed orders keep the price
    /// they were committed with.
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Sets the stock level and active flag of a product.
    async fn update_product_availability(
        &self,
        product: ProductUuid,
        update: AvailabilityUpdate,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Current prices and stock for the given lines.
    async fn get_snapshot(&self, lines: Vec<LineKey>) -> Result<CatalogSnapshot, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_product(price: u64, stock: u32) -> NewProduct {
        NewProduct {
            uuid: ProductUuid::new(),
            name: "Nakshi Kantha".to_string(),
            price,
            stock,
            active: true,
        }
    }

    #[tokio::test]
    async fn create_product_returns_record() -> TestResult {
        let ctx = TestContext::new().await;
        let product = new_product(1200, 4);
        let uuid = product.uuid;

        let created = ctx.catalog.create_product(product).await?;

        assert_eq!(created.uuid, uuid);
        assert_eq!(created.price, 1200);
        assert_eq!(created.stock, 4);
        assert!(created.active);

        Ok(())
    }

    #[tokio::test]
    async fn create_product_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let product = new_product(100, 1);

        ctx.catalog.create_product(product.clone()).await?;

        let result = ctx.catalog.create_product(product).await;

        assert!(
            matches!(result, Err(CatalogServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_variant_for_unknown_product_returns_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_variant(NewVariant {
                uuid: VariantUuid::new(),
                product: ProductUuid::new(),
                name: "Red".to_string(),
                price: None,
                stock: 1,
                active: true,
            })
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn price_beyond_storage_range_is_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.create_product(new_product(u64::MAX, 1)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_product_price_reflects_new_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.catalog.create_product(new_product(500, 1)).await?;

        let updated = ctx.catalog.update_product_price(product.uuid, 650).await?;

        assert_eq!(updated.price, 650);

        Ok(())
    }

    #[tokio::test]
    async fn snapshot_resolves_variant_overrides() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.catalog.create_product(new_product(500, 2)).await?;

        let variant = ctx
            .catalog
            .create_variant(NewVariant {
                uuid: VariantUuid::new(),
                product: product.uuid,
                name: "XL".to_string(),
                price: Some(550),
                stock: 7,
                active: true,
            })
            .await?;

        let product_line = LineKey::product(product.uuid);
        let variant_line = LineKey::variant(product.uuid, variant.uuid);
        let missing_line = LineKey::product(ProductUuid::new());

        let snapshot = ctx
            .catalog
            .get_snapshot(vec![product_line, variant_line, missing_line])
            .await?;

        assert_eq!(snapshot.resolve(product_line).map(|line| line.unit_price), Some(500));
        assert_eq!(snapshot.resolve(variant_line).map(|line| line.unit_price), Some(550));
        assert_eq!(snapshot.resolve(variant_line).map(|line| line.available), Some(7));
        assert!(snapshot.resolve(missing_line).is_none());

        Ok(())
    }

    #[tokio::test]
    async fn deactivated_product_drops_out_of_snapshot() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.catalog.create_product(new_product(500, 2)).await?;

        ctx.catalog
            .update_product_availability(
                product.uuid,
                AvailabilityUpdate {
                    stock: 2,
                    active: false,
                },
            )
            .await?;

        let line = LineKey::product(product.uuid);
        let snapshot = ctx.catalog.get_snapshot(vec![line]).await?;

        assert!(snapshot.resolve(line).is_none());

        Ok(())
    }
}

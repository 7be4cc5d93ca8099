//! Catalog Repository

use bazaar::catalog::{CatalogSnapshot, LineKey, ProductUuid, VariantUuid};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    catalog::{
        data::{AvailabilityUpdate, NewProduct, NewVariant},
        records::{ProductRecord, VariantRecord},
    },
    columns::{
        try_get_amount, try_get_count, try_get_optional_amount, try_i32_from_u32,
        try_i64_from_u64, try_optional_i64_from_u64,
    },
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const CREATE_VARIANT_SQL: &str = include_str!("sql/create_variant.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_VARIANT_SQL: &str = include_str!("sql/get_variant.sql");
const FIND_PRODUCTS_SQL: &str = include_str!("sql/find_products.sql");
const FIND_VARIANTS_SQL: &str = include_str!("sql/find_variants.sql");
const UPDATE_PRODUCT_PRICE_SQL: &str = include_str!("sql/update_product_price.sql");
const UPDATE_PRODUCT_AVAILABILITY_SQL: &str = include_str!("sql/update_product_availability.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(try_i64_from_u64(product.price, "price")?)
            .bind(try_i32_from_u32(product.stock, "stock")?)
            .bind(product.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: NewVariant,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(CREATE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.product.into_uuid())
            .bind(variant.name)
            .bind(try_optional_i64_from_u64(variant.price, "price")?)
            .bind(try_i32_from_u32(variant.stock, "stock")?)
            .bind(variant.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(GET_VARIANT_SQL)
            .bind(variant.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_PRICE_SQL)
            .bind(product.into_uuid())
            .bind(try_i64_from_u64(price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product_availability(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: AvailabilityUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_AVAILABILITY_SQL)
            .bind(product.into_uuid())
            .bind(try_i32_from_u32(update.stock, "stock")?)
            .bind(update.active)
            .fetch_one(&mut **tx)
            .await
    }

    /// Load the authoritative records behind a set of order lines. Missing
    /// ids are simply absent from the snapshot.
    pub(crate) async fn fetch_snapshot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[LineKey],
    ) -> Result<CatalogSnapshot, sqlx::Error> {
        let product_uuids: Vec<Uuid> = lines.iter().map(|line| line.product.into_uuid()).collect();

        let variant_uuids: Vec<Uuid> = lines
            .iter()
            .filter_map(|line| line.variant.map(VariantUuid::into_uuid))
            .collect();

        let products = query_as::<Postgres, ProductRecord>(FIND_PRODUCTS_SQL)
            .bind(&product_uuids)
            .fetch_all(&mut **tx)
            .await?;

        let variants = if variant_uuids.is_empty() {
            Vec::new()
        } else {
            query_as::<Postgres, VariantRecord>(FIND_VARIANTS_SQL)
                .bind(&variant_uuids)
                .fetch_all(&mut **tx)
                .await?
        };

        Ok(CatalogSnapshot::from_records(
            products.into_iter().map(Into::into),
            variants.into_iter().map(Into::into),
        ))
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            stock: try_get_count(row, "stock")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            price: try_get_optional_amount(row, "price")?,
            stock: try_get_count(row, "stock")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

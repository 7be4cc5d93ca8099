//! Stock Repository

use bazaar::catalog::{LineKey, ProductUuid, VariantUuid};
use sqlx::{Postgres, Transaction, query, query_scalar};

use crate::domain::columns::try_i32_from_u32;

const DECREMENT_PRODUCT_STOCK_SQL: &str = include_str!("../sql/decrement_product_stock.sql");
const DECREMENT_VARIANT_STOCK_SQL: &str = include_str!("../sql/decrement_variant_stock.sql");
const AVAILABLE_PRODUCT_STOCK_SQL: &str = include_str!("../sql/available_product_stock.sql");
const AVAILABLE_VARIANT_STOCK_SQL: &str = include_str!("../sql/available_variant_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStockRepository;

impl PgStockRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Take `quantity` units from the line's stock, only if the line is still
    /// available and holds at least that many. Returns the number of rows
    /// updated: `0` means nothing was taken.
    pub(crate) async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: LineKey,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let quantity = try_i32_from_u32(quantity, "stock")?;

        let result = match line.variant {
            None => {
                query(DECREMENT_PRODUCT_STOCK_SQL)
                    .bind(line.product.into_uuid())
                    .bind(quantity)
                    .execute(&mut **tx)
                    .await?
            }
            Some(variant) => {
                query(DECREMENT_VARIANT_STOCK_SQL)
                    .bind(line.product.into_uuid())
                    .bind(variant.into_uuid())
                    .bind(quantity)
                    .execute(&mut **tx)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    /// Current stock of an available line, `None` when the line is inactive,
    /// missing, or a variant of another product.
    pub(crate) async fn available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: LineKey,
    ) -> Result<Option<u32>, sqlx::Error> {
        let stock = match line.variant {
            None => available_product(tx, line.product).await?,
            Some(variant) => available_variant(tx, line.product, variant).await?,
        };

        stock
            .map(|stock| {
                u32::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "stock".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }
}

async fn available_product(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductUuid,
) -> Result<Option<i32>, sqlx::Error> {
    query_scalar::<Postgres, i32>(AVAILABLE_PRODUCT_STOCK_SQL)
        .bind(product.into_uuid())
        .fetch_optional(&mut **tx)
        .await
}

async fn available_variant(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductUuid,
    variant: VariantUuid,
) -> Result<Option<i32>, sqlx::Error> {
    query_scalar::<Postgres, i32>(AVAILABLE_VARIANT_STOCK_SQL)
        .bind(product.into_uuid())
        .bind(variant.into_uuid())
        .fetch_optional(&mut **tx)
        .await
}

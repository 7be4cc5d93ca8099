//! Coupons Repository

use bazaar::coupons::{CouponCode, CouponCodeError, CouponDiscount, CouponUuid};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use thiserror::Error;

use crate::domain::{
    columns::{
        try_get_count, try_get_optional_amount, try_get_optional_count, try_i64_from_u64,
        try_optional_i32_from_u32, try_optional_i64_from_u64,
    },
    coupons::{data::NewCoupon, records::CouponRecord},
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const INCREMENT_COUPON_USAGE_SQL: &str = include_str!("sql/increment_coupon_usage.sql");

const KIND_PERCENTAGE: &str = "percentage";
const KIND_FIXED: &str = "fixed";

/// Percentages are stored as basis points: `10.5%` is `1050`.
const BASIS_POINTS_SCALE: u32 = 2;

#[derive(Debug, Error)]
enum CouponColumnError {
    #[error("percentage must be positive with at most two decimal places")]
    Percentage,

    #[error("unknown coupon kind '{0}'")]
    Kind(String),

    #[error("coupon kind '{0}' is missing its discount value")]
    MissingValue(&'static str),

    #[error("stored coupon code is malformed")]
    Code(#[source] CouponCodeError),
}

impl CouponColumnError {
    fn into_sqlx(self, column: &str) -> sqlx::Error {
        sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(self),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let (kind, percent_bp, max_discount, amount) = to_discount_sql_values(&coupon.discount)?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code.as_str())
            .bind(kind)
            .bind(percent_bp)
            .bind(max_discount)
            .bind(amount)
            .bind(try_optional_i64_from_u64(coupon.min_purchase, "min_purchase")?)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_to))
            .bind(try_optional_i32_from_u32(coupon.usage_limit, "usage_limit")?)
            .bind(coupon.active)
            .fetch_one(&mut **tx)
            .await
    }

    /// Case-insensitive lookup.
    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Charge one use of a coupon if its usage cap allows it. Returns the
    /// number of rows updated: `0` means the cap was already reached.
    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(INCREMENT_COUPON_USAGE_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

type DiscountSqlValues = (&'static str, Option<i32>, Option<i64>, Option<i64>);

fn to_discount_sql_values(discount: &CouponDiscount) -> Result<DiscountSqlValues, sqlx::Error> {
    match discount {
        CouponDiscount::Percentage {
            percent,
            max_discount,
        } => {
            let scaled = *percent * Decimal::ONE_HUNDRED;

            let basis_points = Some(scaled)
                .filter(|scaled| scaled.fract().is_zero())
                .and_then(|scaled| scaled.to_i32())
                .ok_or_else(|| CouponColumnError::Percentage.into_sqlx("percent_bp"))?;

            Ok((
                KIND_PERCENTAGE,
                Some(basis_points),
                try_optional_i64_from_u64(*max_discount, "max_discount")?,
                None,
            ))
        }
        CouponDiscount::Fixed { amount } => Ok((
            KIND_FIXED,
            None,
            None,
            Some(try_i64_from_u64(*amount, "amount")?),
        )),
    }
}

fn discount_from_row(row: &PgRow) -> Result<CouponDiscount, sqlx::Error> {
    let kind: String = row.try_get("kind")?;

    match kind.as_str() {
        KIND_PERCENTAGE => {
            let basis_points: i32 = row
                .try_get::<Option<i32>, _>("percent_bp")?
                .ok_or_else(|| CouponColumnError::MissingValue(KIND_PERCENTAGE).into_sqlx("percent_bp"))?;

            Ok(CouponDiscount::Percentage {
                percent: Decimal::new(i64::from(basis_points), BASIS_POINTS_SCALE),
                max_discount: try_get_optional_amount(row, "max_discount")?,
            })
        }
        KIND_FIXED => {
            let amount = try_get_optional_amount(row, "amount")?
                .ok_or_else(|| CouponColumnError::MissingValue(KIND_FIXED).into_sqlx("amount"))?;

            Ok(CouponDiscount::Fixed { amount })
        }
        _ => Err(CouponColumnError::Kind(kind).into_sqlx("kind")),
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let code: String = row.try_get("code")?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: CouponCode::parse(&code)
                .map_err(|e| CouponColumnError::Code(e).into_sqlx("code"))?,
            discount: discount_from_row(row)?,
            min_purchase: try_get_optional_amount(row, "min_purchase")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_to: row.try_get::<SqlxTimestamp, _>("valid_to")?.to_jiff(),
            usage_limit: try_get_optional_count(row, "usage_limit")?,
            usage_count: try_get_count(row, "usage_count")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percentages_are_stored_as_basis_points() -> TestResult {
        let (kind, percent_bp, max_discount, amount) =
            to_discount_sql_values(&CouponDiscount::Percentage {
                percent: Decimal::new(105, 1),
                max_discount: Some(500),
            })?;

        assert_eq!(kind, KIND_PERCENTAGE);
        assert_eq!(percent_bp, Some(1050));
        assert_eq!(max_discount, Some(500));
        assert_eq!(amount, None);

        Ok(())
    }

    #[test]
    fn sub_basis_point_percentages_are_rejected() {
        let result = to_discount_sql_values(&CouponDiscount::Percentage {
            percent: Decimal::new(10_005, 3),
            max_discount: None,
        });

        assert!(matches!(result, Err(sqlx::Error::ColumnDecode { .. })));
    }
}

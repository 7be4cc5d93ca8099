//! Column conversions between unsigned domain values and signed Postgres
//! integers.

use std::num::TryFromIntError;

use sqlx::{Row, postgres::PgRow};

fn column_error(column: &str, error: TryFromIntError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    }
}

pub(crate) fn try_i64_from_u64(value: u64, column: &'static str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| column_error(column, e))
}

pub(crate) fn try_optional_i64_from_u64(
    value: Option<u64>,
    column: &'static str,
) -> Result<Option<i64>, sqlx::Error> {
    value.map(|v| try_i64_from_u64(v, column)).transpose()
}

pub(crate) fn try_i32_from_u32(value: u32, column: &'static str) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| column_error(column, e))
}

pub(crate) fn try_optional_i32_from_u32(
    value: Option<u32>,
    column: &'static str,
) -> Result<Option<i32>, sqlx::Error> {
    value.map(|v| try_i32_from_u32(v, column)).transpose()
}

pub(crate) fn try_get_amount(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    let amount: i64 = row.try_get(column)?;

    u64::try_from(amount).map_err(|e| column_error(column, e))
}

pub(crate) fn try_get_optional_amount(row: &PgRow, column: &str) -> Result<Option<u64>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(column)?
        .map(|amount| u64::try_from(amount).map_err(|e| column_error(column, e)))
        .transpose()
}

pub(crate) fn try_get_count(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let count: i32 = row.try_get(column)?;

    u32::try_from(count).map_err(|e| column_error(column, e))
}

pub(crate) fn try_get_optional_count(row: &PgRow, column: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(column)?
        .map(|count| u32::try_from(count).map_err(|e| column_error(column, e)))
        .transpose()
}

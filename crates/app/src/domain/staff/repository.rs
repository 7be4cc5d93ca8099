//! Staff Tokens Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::staff::records::{StaffTokenRecord, StaffTokenUuid};

const CREATE_STAFF_TOKEN_SQL: &str = include_str!("sql/create_staff_token.sql");
const FIND_ACTIVE_STAFF_TOKEN_BY_HASH_SQL: &str =
    include_str!("sql/find_active_staff_token_by_hash.sql");
const TOUCH_STAFF_TOKEN_SQL: &str = include_str!("sql/touch_staff_token.sql");
const REVOKE_STAFF_TOKEN_SQL: &str = include_str!("sql/revoke_staff_token.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStaffTokensRepository;

impl PgStaffTokensRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: StaffTokenUuid,
        label: &str,
        token_hash: &str,
    ) -> Result<StaffTokenRecord, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(CREATE_STAFF_TOKEN_SQL)
            .bind(uuid.into_uuid())
            .bind(label)
            .bind(token_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_by_hash(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<StaffTokenRecord>, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(FIND_ACTIVE_STAFF_TOKEN_BY_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn touch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: StaffTokenUuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_STAFF_TOKEN_SQL)
            .bind(uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Returns `None` when the token does not exist or is already revoked.
    pub(crate) async fn revoke(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: StaffTokenUuid,
    ) -> Result<Option<StaffTokenRecord>, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(REVOKE_STAFF_TOKEN_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StaffTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: StaffTokenUuid::from_uuid(row.try_get("uuid")?),
            label: row.try_get("label")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

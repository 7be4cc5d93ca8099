//! Staff service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::staff::{
        errors::StaffServiceError,
        records::{IssuedStaffToken, StaffTokenRecord, StaffTokenUuid},
        repository::PgStaffTokensRepository,
        token::{generate_staff_token, hash_staff_token, parse_staff_token},
    },
};

#[derive(Debug, Clone)]
pub struct PgStaffService {
    db: Db,
    repository: PgStaffTokensRepository,
}

impl PgStaffService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgStaffTokensRepository::new(),
        }
    }

    /// Issue a new staff token.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is blank or the token cannot be stored.
    #[tracing::instrument(name = "staff.service.issue_token", skip(self), err)]
    pub async fn issue_token(&self, label: &str) -> Result<IssuedStaffToken, StaffServiceError> {
        let token = generate_staff_token();

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_token(&mut tx, StaffTokenUuid::new(), label.trim(), &hash_staff_token(&token))
            .await?;

        tx.commit().await?;

        info!(token_uuid = %record.uuid, "issued staff token");

        Ok(IssuedStaffToken { token, record })
    }

    /// Revoke a staff token.
    ///
    /// # Errors
    ///
    /// Returns [`StaffServiceError::NotFound`] if the token does not exist or
    /// was already revoked.
    #[tracing::instrument(name = "staff.service.revoke_token", skip(self), fields(token_uuid = %uuid), err)]
    pub async fn revoke_token(&self, uuid: StaffTokenUuid) -> Result<StaffTokenRecord, StaffServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .revoke(&mut tx, uuid)
            .await?
            .ok_or(StaffServiceError::NotFound)?;

        tx.commit().await?;

        info!("revoked staff token");

        Ok(record)
    }
}

#[async_trait]
impl StaffService for PgStaffService {
    async fn authenticate_bearer(&self, token: &str) -> Result<StaffTokenRecord, StaffServiceError> {
        let token = parse_staff_token(token)?;

        let mut tx = self.db.begin().await?;

        let Some(record) = self
            .repository
            .find_active_by_hash(&mut tx, &hash_staff_token(token))
            .await?
        else {
            warn!("rejected unknown or revoked staff token");

            return Err(StaffServiceError::Unauthorized);
        };

        self.repository.touch(&mut tx, record.uuid).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait StaffService: Send + Sync {
    /// Resolve a bearer token to the staff token it was issued as.
    async fn authenticate_bearer(&self, token: &str) -> Result<StaffTokenRecord, StaffServiceError>;
}

//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        catalog::{CatalogService, PgCatalogService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        staff::{PgStaffService, StaffService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub coupons: Arc<dyn CouponsService>,
    pub orders: Arc<dyn OrdersService>,
    pub staff: Arc<dyn StaffService>,
}

impl AppContext {
    /// Build application context from a database URL, optionally applying
    /// pending migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating
    /// fails.
    pub async fn from_database_url(
        url: &str,
        max_connections: u32,
        run_migrations: bool,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, max_connections)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool).await.map_err(AppInitError::Migrate)?;
        }

        Ok(Self::from_db(&Db::new(pool)))
    }

    #[must_use]
    pub fn from_db(db: &Db) -> Self {
        Self {
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            staff: Arc::new(PgStaffService::new(db.clone())),
        }
    }
}

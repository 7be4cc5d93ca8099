//! Depot helper extensions.

use std::any::Any;

use bazaar_app::domain::staff::records::StaffTokenUuid;
use salvo::prelude::{Depot, StatusError};

const STAFF_TOKEN_DEPOT_KEY: &str = "staff_token_uuid";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }
}

/// The staff token that authenticated the current request.
pub(crate) trait StaffDepotExt {
    fn insert_staff_token(&mut self, token: StaffTokenUuid);

    fn staff_token_or_401(&self) -> Result<StaffTokenUuid, StatusError>;
}

impl StaffDepotExt for Depot {
    fn insert_staff_token(&mut self, token: StaffTokenUuid) {
        self.insert(STAFF_TOKEN_DEPOT_KEY, token);
    }

    fn staff_token_or_401(&self) -> Result<StaffTokenUuid, StatusError> {
        self.get::<StaffTokenUuid>(STAFF_TOKEN_DEPOT_KEY)
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }
}

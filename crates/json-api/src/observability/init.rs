//! Tracing subscriber lifecycle.

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, settings};

/// Initialize structured logging and request observability settings.
pub(crate) fn init(config: &ServerConfig) -> Result<(), ObservabilityError> {
    settings::apply_runtime_config(config);

    logging::init_subscriber(config)
}

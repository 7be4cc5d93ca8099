//! Staff service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::staff::token::StaffTokenError;

#[derive(Debug, Error)]
pub enum StaffServiceError {
    #[error("staff token not found")]
    NotFound,

    #[error("staff token is missing, malformed or revoked")]
    Unauthorized,

    #[error("staff token already exists")]
    AlreadyExists,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for StaffServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<StaffTokenError> for StaffServiceError {
    fn from(_: StaffTokenError) -> Self {
        Self::Unauthorized
    }
}

//! Staff API tokens

pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod token;

pub use errors::StaffServiceError;
pub use service::*;

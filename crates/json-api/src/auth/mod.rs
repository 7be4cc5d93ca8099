//! Staff authentication

pub(crate) mod middleware;

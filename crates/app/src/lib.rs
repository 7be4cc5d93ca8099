//! Bazaar persistence and services over PostgreSQL.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

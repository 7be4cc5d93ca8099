//! Bazaar Domain Concerns

pub mod catalog;
pub(crate) mod columns;
pub mod coupons;
pub mod orders;
pub mod staff;

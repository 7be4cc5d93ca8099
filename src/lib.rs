//! Bazaar
//!
//! Bazaar is the order-placement and discount-consistency core of a retail
//! storefront: cart aggregation, coupon evaluation and order assembly against
//! authoritative catalog prices and stock. Persistence lives in `bazaar-app`.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod pricing;
pub mod uuids;

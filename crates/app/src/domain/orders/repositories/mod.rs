//! Order Repositories

mod orders;
mod stock;

pub(crate) use orders::PgOrdersRepository;
pub(crate) use stock::PgStockRepository;

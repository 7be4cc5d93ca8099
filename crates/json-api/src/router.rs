//! App Router

use salvo::Router;

use crate::{auth, coupons, orders};

/// Storefront routes.
///
/// Checkout, tracking, order lookup and coupon validation are open to
/// customers. Listing and status changes sit behind the staff token check.
pub fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("orders")
                .post(orders::place::handler)
                .push(Router::with_path("track").get(orders::track::handler))
                .push(Router::with_path("{order_number}").get(orders::get::handler)),
        )
        .push(Router::with_path("coupons/validate").post(coupons::validate::handler))
        .push(
            Router::new().hoop(auth::middleware::handler).push(
                Router::with_path("orders")
                    .get(orders::index::handler)
                    .push(Router::with_path("{order_number}").patch(orders::update::handler)),
            ),
        )
}

//! Order Index Handler

use std::sync::Arc;

use bazaar_app::domain::orders::data::Page;
use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Order Index Handler
///
/// Returns the most recent orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders", body = OrdersResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid page"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid staff token"),
    ),
)]
pub(crate) async fn handler(
    limit: QueryParam<u32, false>,
    offset: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.staff_token_or_401()?;

    let page = Page::new(limit.into_inner(), offset.into_inner())
        .map_err(|error| StatusError::bad_request().brief(error.to_string()))?;

    let orders = state
        .app
        .orders
        .list_orders(page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

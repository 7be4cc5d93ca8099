//! Get Order Handler

use std::sync::Arc;

use bazaar::orders::OrderNumber;
use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Returns an order with the prices it was committed at.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order", body = OrderResponse),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order_number: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    // A malformed number cannot name an order.
    let order_number = OrderNumber::parse(&order_number.into_inner())
        .map_err(|_ignored| StatusError::not_found().brief("Order not found"))?;

    let order = state
        .app
        .orders
        .get_order(order_number)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

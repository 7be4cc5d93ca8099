//! Update Order Status Handler

use std::sync::Arc;

use bazaar::orders::OrderNumber;
use bazaar_app::domain::orders::data::StatusUpdate;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;

use crate::{
    errors::{ApiError, ErrorResponse},
    extensions::*,
    orders::{
        errors::into_api_error,
        models::{OrderResponse, UpdateOrderStatusRequest},
    },
    state::State,
};

/// Update Order Status Handler
///
/// Moves an order along its status graph. Setting the current status again
/// changes nothing.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated", body = OrderResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "No status given", body = ErrorResponse),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid staff token"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Illegal transition or concurrent update", body = ErrorResponse),
    ),
)]
pub(crate) async fn handler(
    order_number: PathParam<String>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
    res: &mut Response,
) {
    let update = StatusUpdate::from(json.into_inner());

    match update_status(order_number.into_inner(), update, depot).await {
        Ok(order) => res.render(Json(order)),
        Err(error) => res.render(error),
    }
}

async fn update_status(
    order_number: String,
    update: StatusUpdate,
    depot: &Depot,
) -> Result<OrderResponse, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let staff_token = depot.staff_token_or_401()?;

    let order_number = OrderNumber::parse(&order_number)
        .map_err(|_ignored| StatusError::not_found().brief("Order not found"))?;

    if update.is_empty() {
        return Err(ApiError::rejected(
            StatusCode::BAD_REQUEST,
            ErrorResponse::invalid_field("orderStatus", "orderStatus or paymentStatus is required"),
        ));
    }

    let order = state
        .app
        .orders
        .update_status(order_number, update)
        .await
        .map_err(into_api_error)?;

    info!(
        staff_token_uuid = %staff_token,
        order_number = %order.order_number,
        order_status = %order.order_status,
        payment_status = %order.payment_status,
        "staff updated order status"
    );

    Ok(order.into())
}

#[cfg(test)]
mod tests {
    use bazaar::orders::{OrderStatus, PaymentStatus, TransitionError};
    use bazaar_app::domain::orders::{MockOrdersService, OrdersServiceError};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        orders::models::OrderStatusBody,
        test_helpers::{TEST_ORDER_NUMBER, make_order, order_number, orders_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(
            orders,
            Router::with_path("orders/{order_number}").patch(handler),
        )
    }

    fn url() -> String {
        format!("http://example.com/orders/{TEST_ORDER_NUMBER}")
    }

    #[tokio::test]
    async fn test_update_status_returns_updated_order() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(|number, update| {
                *number == order_number()
                    && *update
                        == StatusUpdate {
                            order_status: Some(OrderStatus::Shipped),
                            payment_status: None,
                        }
            })
            .return_once(|_, _| Ok(make_order(OrderStatus::Shipped)));

        let mut res = TestClient::patch(url())
            .json(&json!({ "orderStatus": "SHIPPED" }))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.order_status, OrderStatusBody::Shipped);

        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_transition_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().once().return_once(|_, _| {
            Err(OrdersServiceError::IllegalTransition(TransitionError::Payment {
                from: PaymentStatus::Paid,
                to: PaymentStatus::Pending,
            }))
        });

        let mut res = TestClient::patch(url())
            .json(&json!({ "paymentStatus": "PENDING" }))
            .send(&make_service(orders))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(body.code, "ILLEGAL_TRANSITION");

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_update_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::StatusConflict));

        let mut res = TestClient::patch(url())
            .json(&json!({ "orderStatus": "CONFIRMED" }))
            .send(&make_service(orders))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(body.code, "STATUS_CONFLICT");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_update_returns_400() {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::patch(url())
            .json(&json!({}))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_unknown_status_value_returns_400() {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::patch(url())
            .json(&json!({ "orderStatus": "LOST" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}

//! Track Orders Handler

use std::sync::Arc;

use bazaar::customers::PhoneNumber;
use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Track Orders Handler
///
/// Returns every order placed with a phone number, newest first. The number
/// may be given in any accepted format.
#[endpoint(
    tags("orders"),
    summary = "Track Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders", body = OrdersResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid phone number"),
    ),
)]
pub(crate) async fn handler(
    phone: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let phone = PhoneNumber::parse(&phone.into_inner())
        .map_err(|error| StatusError::bad_request().brief(error.to_string()))?;

    let orders = state
        .app
        .orders
        .track_orders(phone)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use bazaar::orders::OrderStatus;
    use bazaar_app::domain::orders::MockOrdersService;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/track").get(handler))
    }

    #[tokio::test]
    async fn test_track_normalises_phone() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_track_orders()
            .once()
            .withf(|phone| phone.as_str() == "01712345678")
            .return_once(|_| {
                Ok(vec![
                    make_order(OrderStatus::Shipped),
                    make_order(OrderStatus::Delivered),
                ])
            });

        let mut res = TestClient::get("http://example.com/orders/track?phone=%2B8801712-345678")
            .send(&make_service(orders))
            .await;

        let body: OrdersResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.orders.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_phone_returns_400() {
        let mut orders = MockOrdersService::new();

        orders.expect_track_orders().never();

        let res = TestClient::get("http://example.com/orders/track?phone=12345")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_missing_phone_returns_400() {
        let mut orders = MockOrdersService::new();

        orders.expect_track_orders().never();

        let res = TestClient::get("http://example.com/orders/track")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}

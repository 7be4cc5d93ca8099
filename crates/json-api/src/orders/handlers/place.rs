//! Place Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    errors::{ApiError, ErrorResponse},
    extensions::*,
    observability::{record_checkout_rejection, record_order_placed},
    orders::{
        errors::into_api_error,
        models::{OrderPlacedResponse, PlaceOrderRequest},
    },
    state::State,
};

/// Place Order Handler
///
/// Re-prices the submitted lines against the catalog, applies the coupon and
/// commits the order. Prices sent by the client are never trusted.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed", body = OrderPlacedResponse),
        (status_code = StatusCode::OK, description = "Idempotency key replayed", body = OrderPlacedResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid input", body = ErrorResponse),
        (status_code = StatusCode::CONFLICT, description = "Product unavailable, insufficient stock or coupon exhausted", body = ErrorResponse),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon invalid", body = ErrorResponse),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) {
    if let Err(error) = place_order(json.into_inner(), depot, res).await {
        if let Some(code) = error.code() {
            record_checkout_rejection(code);
        }

        res.render(error);
    }
}

async fn place_order(
    request: PlaceOrderRequest,
    depot: &Depot,
    res: &mut Response,
) -> Result<(), ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let placed = state
        .app
        .orders
        .place_order(request.into())
        .await
        .map_err(into_api_error)?;

    if placed.replayed {
        res.status_code(StatusCode::OK);
    } else {
        record_order_placed();

        res.add_header(LOCATION, format!("/orders/{}", placed.order_number), true)
            .or_500("failed to set location header")?
            .status_code(StatusCode::CREATED);
    }

    res.render(Json(OrderPlacedResponse {
        order_number: placed.order_number.to_string(),
        total: placed.total,
        replayed: placed.replayed,
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use bazaar::{
        catalog::{LineKey, ProductUuid},
        checkout::AssemblyError,
        coupons::CouponError,
        customers::ValidationErrors,
        orders::OrderUuid,
    };
    use bazaar_app::domain::orders::{MockOrdersService, OrdersServiceError, data::PlacedOrder};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test_helpers::{TEST_ORDER_NUMBER, order_number, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders").post(handler))
    }

    fn placed(replayed: bool) -> PlacedOrder {
        PlacedOrder {
            uuid: OrderUuid::new(),
            order_number: order_number(),
            total: 4500,
            replayed,
        }
    }

    fn body(product: Uuid) -> Value {
        json!({
            "customer": {
                "name": "Rahima Khatun",
                "phone": "01712345678",
                "address": "House 12, Road 4, Dhanmondi, Dhaka"
            },
            "payment": { "method": "COD" },
            "items": [{ "productId": product, "quantity": 2, "price": 1 }],
            "couponCode": "WELCOME10",
            "idempotencyKey": "checkout-42"
        })
    }

    #[tokio::test]
    async fn test_place_order_returns_201_with_order_number() -> TestResult {
        let product = Uuid::now_v7();

        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .withf(move |request| {
                request.items.len() == 1
                    && request.items.first().map(|line| line.product.into_uuid()) == Some(product)
                    && request.coupon_code.as_deref() == Some("WELCOME10")
                    && request.idempotency_key.as_deref() == Some("checkout-42")
            })
            .return_once(|_| Ok(placed(false)));

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(product))
            .send(&make_service(orders))
            .await;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let response: OrderPlacedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{TEST_ORDER_NUMBER}")));
        assert_eq!(response.order_number, TEST_ORDER_NUMBER);
        assert_eq!(response.total, 4500);
        assert!(!response.replayed);

        Ok(())
    }

    #[tokio::test]
    async fn test_replayed_order_returns_200() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .return_once(|_| Ok(placed(true)));

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(Uuid::now_v7()))
            .send(&make_service(orders))
            .await;

        let response: OrderPlacedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(response.replayed);

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_returns_409_with_line() -> TestResult {
        let product = ProductUuid::new();

        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(move |_| {
            Err(OrdersServiceError::Rejected(AssemblyError::InsufficientStock {
                line: LineKey::product(product),
                requested: 2,
                available: 1,
            }))
        });

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(product.into_uuid()))
            .send(&make_service(orders))
            .await;

        let response: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(response.code, "INSUFFICIENT_STOCK");
        assert_eq!(response.available, Some(1));
        assert_eq!(
            response.line.map(|line| line.product_id),
            Some(product.into_uuid())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_checkout_returns_400_with_fields() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(|_| {
            let mut errors = ValidationErrors::new();

            errors.push("customer.phone", "must be a Bangladeshi mobile number");

            Err(OrdersServiceError::Invalid(errors))
        });

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(Uuid::now_v7()))
            .send(&make_service(orders))
            .await;

        let response: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(response.code, "INVALID_INPUT");
        assert_eq!(
            response
                .fields
                .unwrap_or_default()
                .into_iter()
                .map(|field| field.field)
                .collect::<Vec<_>>(),
            ["customer.phone"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_coupon_returns_422_with_reason() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(|_| {
            Err(OrdersServiceError::Rejected(AssemblyError::CouponInvalid(
                CouponError::Expired,
            )))
        });

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(Uuid::now_v7()))
            .send(&make_service(orders))
            .await;

        let response: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(response.code, "COUPON_INVALID");
        assert_eq!(response.reason.as_deref(), Some("EXPIRED"));

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_never_reaches_service() {
        let mut orders = MockOrdersService::new();

        orders.expect_place_order().never();

        let res = TestClient::post("http://example.com/orders")
            .json(&json!({ "items": "lots" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}

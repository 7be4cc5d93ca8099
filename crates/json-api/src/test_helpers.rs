//! Test helpers.

use std::sync::Arc;

use bazaar::{
    customers::PaymentMethod,
    orders::{Order, OrderNumber, OrderStatus, OrderUuid, PaymentStatus},
};
use bazaar_app::{
    context::AppContext,
    domain::{
        catalog::MockCatalogService,
        coupons::MockCouponsService,
        orders::MockOrdersService,
        staff::{MockStaffService, records::StaffTokenUuid},
    },
};
use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_STAFF_TOKEN_UUID: StaffTokenUuid = StaffTokenUuid::from_uuid(Uuid::nil());

pub(crate) const TEST_ORDER_NUMBER: &str = "BZ-250114-K7M2QX";

#[salvo::handler]
pub(crate) async fn inject_staff_token(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_staff_token(TEST_STAFF_TOKEN_UUID);
    ctrl.call_next(req, depot, res).await;
}

fn strict_catalog_mock() -> MockCatalogService {
    let mut catalog = MockCatalogService::new();

    catalog.expect_create_product().never();
    catalog.expect_create_variant().never();
    catalog.expect_get_product().never();
    catalog.expect_get_variant().never();
    catalog.expect_update_product_price().never();
    catalog.expect_update_product_availability().never();
    catalog.expect_get_snapshot().never();

    catalog
}

fn strict_coupons_mock() -> MockCouponsService {
    let mut coupons = MockCouponsService::new();

    coupons.expect_create_coupon().never();
    coupons.expect_get_coupon().never();
    coupons.expect_validate_coupon().never();

    coupons
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_assemble_order().never();
    orders.expect_commit_order().never();
    orders.expect_place_order().never();
    orders.expect_get_order().never();
    orders.expect_track_orders().never();
    orders.expect_list_orders().never();
    orders.expect_list_orders_for_user().never();
    orders.expect_update_status().never();

    orders
}

fn strict_staff_mock() -> MockStaffService {
    let mut staff = MockStaffService::new();

    staff.expect_authenticate_bearer().never();

    staff
}

fn state(
    coupons: MockCouponsService,
    orders: MockOrdersService,
    staff: MockStaffService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        catalog: Arc::new(strict_catalog_mock()),
        coupons: Arc::new(coupons),
        orders: Arc::new(orders),
        staff: Arc::new(staff),
    })
}

pub(crate) fn state_with_staff(staff: MockStaffService) -> Arc<State> {
    state(strict_coupons_mock(), strict_orders_mock(), staff)
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_coupons_mock(), orders, strict_staff_mock())))
            .hoop(inject_staff_token)
            .push(route),
    )
}

pub(crate) fn coupons_service(coupons: MockCouponsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(coupons, strict_orders_mock(), strict_staff_mock())))
            .push(route),
    )
}

/// Serves `route` with real staff authentication in front of it.
pub(crate) fn staff_service(
    orders: MockOrdersService,
    staff: MockStaffService,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_coupons_mock(), orders, staff)))
            .push(route),
    )
}

pub(crate) fn order_number() -> OrderNumber {
    OrderNumber::from_storage(TEST_ORDER_NUMBER.to_string())
}

pub(crate) fn make_order(order_status: OrderStatus) -> Order {
    Order {
        uuid: OrderUuid::from_uuid(Uuid::nil()),
        order_number: order_number(),
        customer_name: "Rahima Khatun".to_string(),
        customer_phone: "01712345678".to_string(),
        customer_address: "House 12, Road 4, Dhanmondi, Dhaka".to_string(),
        customer_email: None,
        user_uuid: None,
        payment_method: PaymentMethod::Cod,
        payment_reference: None,
        items: Vec::new(),
        subtotal: 5000,
        discount: 500,
        total: 4500,
        coupon_code: Some("WELCOME10".to_string()),
        order_status,
        payment_status: PaymentStatus::Pending,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

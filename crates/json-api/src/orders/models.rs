//! Order request and response bodies.

use bazaar::{
    catalog::{ProductUuid, VariantUuid},
    checkout::{CheckoutRequest, LineRequest},
    customers::{CustomerInfo, PaymentInfo, PaymentMethod},
    orders::{Order, OrderItem, OrderStatus, PaymentStatus},
};
use bazaar_app::domain::orders::data::StatusUpdate;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer contact details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerRequest {
    pub name: String,

    /// Bangladeshi mobile number, e.g. `01712345678` or `+880 1712-345678`
    pub phone: String,

    pub address: String,

    #[serde(default)]
    pub email: Option<String>,
}

impl From<CustomerRequest> for CustomerInfo {
    fn from(request: CustomerRequest) -> Self {
        CustomerInfo {
            name: request.name,
            phone: request.phone,
            address: request.address,
            email: request.email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum PaymentMethodBody {
    Cod,
    Bkash,
}

impl From<PaymentMethodBody> for PaymentMethod {
    fn from(method: PaymentMethodBody) -> Self {
        match method {
            PaymentMethodBody::Cod => PaymentMethod::Cod,
            PaymentMethodBody::Bkash => PaymentMethod::Bkash,
        }
    }
}

impl From<PaymentMethod> for PaymentMethodBody {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cod => PaymentMethodBody::Cod,
            PaymentMethod::Bkash => PaymentMethodBody::Bkash,
        }
    }
}

/// Payment details. bKash payments carry the sender number and transaction id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentRequest {
    pub method: PaymentMethodBody,

    #[serde(default)]
    pub bkash_number: Option<String>,

    #[serde(default)]
    pub bkash_transaction_id: Option<String>,
}

impl From<PaymentRequest> for PaymentInfo {
    fn from(request: PaymentRequest) -> Self {
        PaymentInfo {
            method: request.method.into(),
            bkash_number: request.bkash_number,
            bkash_transaction_id: request.bkash_transaction_id,
        }
    }
}

/// Requested order line. Prices are always taken from the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineItemRequest {
    pub product_id: Uuid,

    #[serde(default)]
    pub variant_id: Option<Uuid>,

    pub quantity: u32,
}

impl From<LineItemRequest> for LineRequest {
    fn from(request: LineItemRequest) -> Self {
        LineRequest {
            product: ProductUuid::from_uuid(request.product_id),
            variant: request.variant_id.map(VariantUuid::from_uuid),
            quantity: request.quantity,
        }
    }
}

/// Place Order Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderRequest {
    pub customer: CustomerRequest,
    pub payment: PaymentRequest,
    pub items: Vec<LineItemRequest>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    /// Signed-in customer placing the order
    #[serde(default)]
    pub user_id: Option<Uuid>,

    /// Client-generated key; resubmitting it returns the original order
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl From<PlaceOrderRequest> for CheckoutRequest {
    fn from(request: PlaceOrderRequest) -> Self {
        CheckoutRequest {
            customer: request.customer.into(),
            payment: request.payment.into(),
            items: request.items.into_iter().map(Into::into).collect(),
            coupon_code: request.coupon_code,
            user_id: request.user_id,
            idempotency_key: request.idempotency_key,
        }
    }
}

/// Order Placed Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderPlacedResponse {
    pub order_number: String,

    /// Amount payable
    pub total: u64,

    /// The idempotency key had already produced this order
    pub replayed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum OrderStatusBody {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl From<OrderStatusBody> for OrderStatus {
    fn from(status: OrderStatusBody) -> Self {
        match status {
            OrderStatusBody::Pending => OrderStatus::Pending,
            OrderStatusBody::Confirmed => OrderStatus::Confirmed,
            OrderStatusBody::Processing => OrderStatus::Processing,
            OrderStatusBody::Shipped => OrderStatus::Shipped,
            OrderStatusBody::Delivered => OrderStatus::Delivered,
            OrderStatusBody::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl From<OrderStatus> for OrderStatusBody {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => OrderStatusBody::Pending,
            OrderStatus::Confirmed => OrderStatusBody::Confirmed,
            OrderStatus::Processing => OrderStatusBody::Processing,
            OrderStatus::Shipped => OrderStatusBody::Shipped,
            OrderStatus::Delivered => OrderStatusBody::Delivered,
            OrderStatus::Cancelled => OrderStatusBody::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum PaymentStatusBody {
    Pending,
    Paid,
    Failed,
}

impl From<PaymentStatusBody> for PaymentStatus {
    fn from(status: PaymentStatusBody) -> Self {
        match status {
            PaymentStatusBody::Pending => PaymentStatus::Pending,
            PaymentStatusBody::Paid => PaymentStatus::Paid,
            PaymentStatusBody::Failed => PaymentStatus::Failed,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusBody {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => PaymentStatusBody::Pending,
            PaymentStatus::Paid => PaymentStatusBody::Paid,
            PaymentStatus::Failed => PaymentStatusBody::Failed,
        }
    }
}

/// Update Order Status Request
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub order_status: Option<OrderStatusBody>,

    #[serde(default)]
    pub payment_status: Option<PaymentStatusBody>,
}

impl From<UpdateOrderStatusRequest> for StatusUpdate {
    fn from(request: UpdateOrderStatusRequest) -> Self {
        StatusUpdate {
            order_status: request.order_status.map(Into::into),
            payment_status: request.payment_status.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub product_id: Uuid,

    #[serde(default)]
    pub variant_id: Option<Uuid>,

    /// Product name at the time of purchase
    pub name: String,

    pub quantity: u32,

    /// Unit price frozen at commit
    pub unit_price: u64,

    pub line_total: u64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            product_id: item.product_uuid.into(),
            variant_id: item.variant_uuid.map(Into::into),
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub user_id: Option<Uuid>,

    pub payment_method: PaymentMethodBody,

    #[serde(default)]
    pub bkash_number: Option<String>,

    #[serde(default)]
    pub bkash_transaction_id: Option<String>,

    pub items: Vec<OrderItemResponse>,
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,

    #[serde(default)]
    pub coupon_code: Option<String>,

    pub order_status: OrderStatusBody,
    pub payment_status: PaymentStatusBody,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let (bkash_number, bkash_transaction_id) = order
            .payment_reference
            .map(|reference| (reference.bkash_number, reference.bkash_trx_id))
            .unzip();

        OrderResponse {
            order_number: order.order_number.to_string(),
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            customer_email: order.customer_email,
            user_id: order.user_uuid,
            payment_method: order.payment_method.into(),
            bkash_number,
            bkash_transaction_id,
            items: order.items.into_iter().map(Into::into).collect(),
            subtotal: order.subtotal,
            discount: order.discount,
            total: order.total,
            coupon_code: order.coupon_code,
            order_status: order.order_status.into(),
            payment_status: order.payment_status.into(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Orders Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// Orders, newest first
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<Order>> for OrdersResponse {
    fn from(orders: Vec<Order>) -> Self {
        OrdersResponse {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

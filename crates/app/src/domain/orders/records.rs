//! Orders Records

use bazaar::{
    customers::PaymentMethod,
    orders::{
        Order, OrderItem, OrderNumber, OrderStatus, OrderUuid, PaymentReference, PaymentStatus,
    },
};
use jiff::Timestamp;
use uuid::Uuid;

/// Order Record, without its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_email: Option<String>,
    pub user_uuid: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<PaymentReference>,
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    #[must_use]
    pub fn with_items(self, items: Vec<OrderItem>) -> Order {
        Order {
            uuid: self.uuid,
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
            customer_email: self.customer_email,
            user_uuid: self.user_uuid,
            payment_method: self.payment_method,
            payment_reference: self.payment_reference,
            items,
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            coupon_code: self.coupon_code,
            order_status: self.order_status,
            payment_status: self.payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub order_uuid: OrderUuid,
    pub position: u32,
    pub item: OrderItem,
}

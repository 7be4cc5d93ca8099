//! Orders Repository

use bazaar::{
    catalog::{ProductUuid, VariantUuid},
    customers::{PaymentMethod, PhoneNumber},
    orders::{
        DraftItem, IdempotencyKey, OrderDraft, OrderItem, OrderNumber, OrderStatus, OrderUuid,
        PaymentReference, PaymentStatus,
    },
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    columns::{try_get_amount, try_get_count, try_i32_from_u32, try_i64_from_u64},
    orders::records::{OrderItemRecord, OrderRecord},
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const INSERT_ORDER_ITEM_SQL: &str = include_str!("../sql/insert_order_item.sql");
const FIND_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/find_order_by_number.sql");
const FIND_ORDER_BY_IDEMPOTENCY_KEY_SQL: &str =
    include_str!("../sql/find_order_by_idempotency_key.sql");
const FIND_ORDERS_BY_PHONE_SQL: &str = include_str!("../sql/find_orders_by_phone.sql");
const FIND_ORDERS_BY_USER_SQL: &str = include_str!("../sql/find_orders_by_user.sql");
const FIND_RECENT_ORDERS_SQL: &str = include_str!("../sql/find_recent_orders.sql");
const FIND_ORDER_ITEMS_SQL: &str = include_str!("../sql/find_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

#[derive(Debug, Error)]
#[error("unrecognised value '{0}'")]
struct UnknownValue(String);

fn unknown_value(column: &str, value: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(UnknownValue(value)),
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the order header. Returns `None` when the order number or
    /// idempotency key is already taken.
    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
        draft: &OrderDraft,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let customer = draft.customer();
        let reference = PaymentReference::from_payment(draft.payment());
        let (bkash_number, bkash_trx_id) = reference
            .map(|reference| (reference.bkash_number, reference.bkash_trx_id))
            .unzip();

        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(uuid.into_uuid())
            .bind(draft.order_number().as_str())
            .bind(draft.idempotency_key().map(IdempotencyKey::as_str))
            .bind(customer.name.as_str())
            .bind(customer.phone.as_str())
            .bind(customer.address.as_str())
            .bind(customer.email.as_deref())
            .bind(draft.user())
            .bind(draft.payment().method().as_str())
            .bind(bkash_number)
            .bind(bkash_trx_id)
            .bind(try_i64_from_u64(draft.subtotal(), "subtotal")?)
            .bind(try_i64_from_u64(draft.discount(), "discount")?)
            .bind(try_i64_from_u64(draft.total(), "total")?)
            .bind(draft.coupon().map(|coupon| coupon.uuid.into_uuid()))
            .bind(draft.coupon().map(|coupon| coupon.code.as_str()))
            .bind(SqlxTimestamp::from(draft.created_at()))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        items: &[DraftItem],
    ) -> Result<(), sqlx::Error> {
        for (position, item) in (0_u32..).zip(items) {
            query(INSERT_ORDER_ITEM_SQL)
                .bind(order.into_uuid())
                .bind(try_i32_from_u32(position, "position")?)
                .bind(item.key.product.into_uuid())
                .bind(item.key.variant.map(VariantUuid::into_uuid))
                .bind(item.name.as_str())
                .bind(try_i32_from_u32(item.quantity, "quantity")?)
                .bind(try_i64_from_u64(item.unit_price, "unit_price")?)
                .bind(try_i64_from_u64(item.line_total, "line_total")?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Keys are scoped to the customer's phone; another customer's key never
    /// matches.
    pub(crate) async fn find_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        phone: &PhoneNumber,
        key: &IdempotencyKey,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_IDEMPOTENCY_KEY_SQL)
            .bind(phone.as_str())
            .bind(key.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_NUMBER_SQL)
            .bind(order_number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Orders placed with a phone number, newest first.
    pub(crate) async fn find_by_phone(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        phone: &str,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDERS_BY_PHONE_SQL)
            .bind(phone)
            .fetch_all(&mut **tx)
            .await
    }

    /// Orders placed by a signed-in customer, newest first.
    pub(crate) async fn find_by_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: Uuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDERS_BY_USER_SQL)
            .bind(user)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_recent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_RECENT_ORDERS_SQL)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&mut **tx)
            .await
    }

    /// Items of the given orders, keyed by order and in line order.
    pub(crate) async fn find_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<FxHashMap<OrderUuid, Vec<OrderItem>>, sqlx::Error> {
        let mut items: FxHashMap<OrderUuid, Vec<OrderItem>> = FxHashMap::default();

        if orders.is_empty() {
            return Ok(items);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        let records = query_as::<Postgres, OrderItemRecord>(FIND_ORDER_ITEMS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        for record in records {
            items.entry(record.order_uuid).or_default().push(record.item);
        }

        Ok(items)
    }

    /// Compare-and-set both statuses. Returns `None` when either status no
    /// longer matches `expected`.
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        expected: (OrderStatus, PaymentStatus),
        next: (OrderStatus, PaymentStatus),
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(expected.0.as_str())
            .bind(expected.1.as_str())
            .bind(next.0.as_str())
            .bind(next.1.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_method: String = row.try_get("payment_method")?;
        let order_status: String = row.try_get("order_status")?;
        let payment_status: String = row.try_get("payment_status")?;

        let bkash_number: Option<String> = row.try_get("bkash_number")?;
        let bkash_trx_id: Option<String> = row.try_get("bkash_trx_id")?;

        let payment_reference = bkash_number
            .zip(bkash_trx_id)
            .map(|(bkash_number, bkash_trx_id)| PaymentReference {
                bkash_number,
                bkash_trx_id,
            });

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: OrderNumber::from_storage(row.try_get("order_number")?),
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_address: row.try_get("customer_address")?,
            customer_email: row.try_get("customer_email")?,
            user_uuid: row.try_get("user_uuid")?,
            payment_method: PaymentMethod::from_storage(&payment_method)
                .ok_or_else(|| unknown_value("payment_method", payment_method))?,
            payment_reference,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            total: try_get_amount(row, "total")?,
            coupon_code: row.try_get("coupon_code")?,
            order_status: OrderStatus::from_storage(&order_status)
                .ok_or_else(|| unknown_value("order_status", order_status))?,
            payment_status: PaymentStatus::from_storage(&payment_status)
                .ok_or_else(|| unknown_value("payment_status", payment_status))?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            position: try_get_count(row, "position")?,
            item: OrderItem {
                product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                variant_uuid: row
                    .try_get::<Option<Uuid>, _>("variant_uuid")?
                    .map(VariantUuid::from_uuid),
                name: row.try_get("name")?,
                quantity: try_get_count(row, "quantity")?,
                unit_price: try_get_amount(row, "unit_price")?,
                line_total: try_get_amount(row, "line_total")?,
            },
        })
    }
}

//! Orders service.
//!
//! Placing an order is assembly followed by commit. Assembly reads the
//! catalog and coupon store and prices the order without side effects. Commit
//! is the only place stock and coupon usage change, and it does so in one
//! transaction: stock is taken with conditional decrements, coupon usage with
//! a conditional increment, and the order and its items are written last.
//! Returning early from commit drops the transaction, which rolls back every
//! mutation made so far.

use async_trait::async_trait;
use bazaar::{
    checkout::{AssemblyError, CheckoutRequest, ValidatedCheckout, assemble},
    coupons::Coupon,
    customers::PhoneNumber,
    orders::{IdempotencyKey, Order, OrderDraft, OrderNumber, OrderUuid},
};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, debug, info, warn};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository,
        coupons::repository::PgCouponsRepository,
        orders::{
            data::{Page, PlacedOrder, StatusUpdate},
            errors::OrdersServiceError,
            records::OrderRecord,
            repositories::{PgOrdersRepository, PgStockRepository},
        },
    },
};

/// Attempts at finding an unused order number within one commit.
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    catalog: PgCatalogRepository,
    coupons: PgCouponsRepository,
    orders: PgOrdersRepository,
    stock: PgStockRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            catalog: PgCatalogRepository::new(),
            coupons: PgCouponsRepository::new(),
            orders: PgOrdersRepository::new(),
            stock: PgStockRepository::new(),
        }
    }

    /// Take stock for every line, in lock order. Fails on the first line
    /// that cannot be served.
    async fn take_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: &OrderDraft,
    ) -> Result<(), OrdersServiceError> {
        for (line, requested) in draft.stock_decrements() {
            if self.stock.decrement(tx, line, requested).await? > 0 {
                continue;
            }

            let rejection = match self.stock.available(tx, line).await? {
                Some(available) => AssemblyError::InsufficientStock {
                    line,
                    requested,
                    available,
                },
                None => AssemblyError::ProductUnavailable { line },
            };

            return Err(rejection.into());
        }

        Ok(())
    }

    /// The order an earlier submission with the same customer and key
    /// produced, if any.
    async fn find_replay(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        phone: &PhoneNumber,
        key: Option<&IdempotencyKey>,
    ) -> Result<Option<OrderRecord>, OrdersServiceError> {
        let Some(key) = key else {
            return Ok(None);
        };

        Ok(self.orders.find_by_idempotency_key(tx, phone, key).await?)
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        records: Vec<OrderRecord>,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        let uuids: Vec<OrderUuid> = records.iter().map(|record| record.uuid).collect();
        let mut items = self.orders.find_items(tx, &uuids).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let lines = items.remove(&record.uuid).unwrap_or_default();

                record.with_items(lines)
            })
            .collect())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.assemble_order",
        skip(self, checkout),
        fields(lines = checkout.lines().len()),
        err
    )]
    async fn assemble_order(&self, checkout: ValidatedCheckout) -> Result<OrderDraft, OrdersServiceError> {
        let lines: Vec<_> = checkout.line_keys().collect();

        let mut tx = self.db.begin().await?;

        let snapshot = self.catalog.fetch_snapshot(&mut tx, &lines).await?;

        let coupon = match checkout.coupon_code() {
            Some(code) => self
                .coupons
                .find_coupon_by_code(&mut tx, code)
                .await?
                .map(Coupon::from),
            None => None,
        };

        tx.commit().await?;

        let draft = assemble(
            &checkout,
            &snapshot,
            coupon.as_ref(),
            Timestamp::now(),
            &mut rand::thread_rng(),
        )?;

        debug!(
            subtotal = draft.subtotal(),
            discount = draft.discount(),
            total = draft.total(),
            "assembled order"
        );

        Ok(draft)
    }

    #[tracing::instrument(
        name = "orders.service.commit_order",
        skip(self, draft),
        fields(order_number = %draft.order_number(), total = draft.total()),
        err
    )]
    async fn commit_order(&self, draft: OrderDraft) -> Result<PlacedOrder, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let phone = &draft.customer().phone;

        if let Some(existing) = self.find_replay(&mut tx, phone, draft.idempotency_key()).await? {
            info!(order_number = %existing.order_number, "replayed order");

            return Ok(PlacedOrder::replayed(&existing));
        }

        self.take_stock(&mut tx, &draft).await?;

        if let Some(coupon) = draft.coupon()
            && self.coupons.increment_usage(&mut tx, coupon.uuid).await? == 0
        {
            return Err(OrdersServiceError::CouponExhausted);
        }

        let uuid = OrderUuid::new();
        let mut draft = draft;

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            if let Some(created) = self.orders.insert_order(&mut tx, uuid, &draft).await? {
                self.orders.insert_items(&mut tx, created.uuid, draft.items()).await?;

                tx.commit().await?;

                info!(
                    order_uuid = %created.uuid,
                    order_number = %created.order_number,
                    total = created.total,
                    "placed order"
                );

                return Ok(PlacedOrder::created(&created));
            }

            // A concurrent submission with the same key won the insert.
            if let Some(existing) = self
                .find_replay(&mut tx, &draft.customer().phone, draft.idempotency_key())
                .await?
            {
                info!(order_number = %existing.order_number, "replayed order");

                return Ok(PlacedOrder::replayed(&existing));
            }

            warn!(attempt, order_number = %draft.order_number(), "order number collision");

            let next = OrderNumber::generate(Timestamp::now(), &mut rand::thread_rng());
            draft = draft.with_order_number(next);
        }

        Err(OrdersServiceError::OrderNumberExhausted)
    }

    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, request),
        fields(order_number = tracing::field::Empty, replayed = tracing::field::Empty),
        err
    )]
    async fn place_order(&self, request: CheckoutRequest) -> Result<PlacedOrder, OrdersServiceError> {
        let checkout = request.validate()?;

        // Replays skip the stock and coupon checks.
        if checkout.idempotency_key().is_some() {
            let mut tx = self.db.begin().await?;

            let existing = self
                .find_replay(&mut tx, &checkout.customer().phone, checkout.idempotency_key())
                .await?;

            tx.commit().await?;

            if let Some(existing) = existing {
                info!(order_number = %existing.order_number, "replayed order");

                let placed = PlacedOrder::replayed(&existing);

                Span::current()
                    .record("order_number", tracing::field::display(&placed.order_number))
                    .record("replayed", placed.replayed);

                return Ok(placed);
            }
        }

        let draft = self.assemble_order(checkout.clone()).await?;

        let placed = match self.commit_order(draft).await {
            Err(error) if error.is_retryable() => {
                warn!(reason = error.reason_code(), "commit lost a race, re-assembling once");

                let draft = self.assemble_order(checkout).await?;

                self.commit_order(draft).await?
            }
            result => result?,
        };

        Span::current()
            .record("order_number", tracing::field::display(&placed.order_number))
            .record("replayed", placed.replayed);

        Ok(placed)
    }

    async fn get_order(&self, order_number: OrderNumber) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.find_by_number(&mut tx, &order_number).await?;
        let order = self.attach_items(&mut tx, vec![record]).await?;

        tx.commit().await?;

        order.into_iter().next().ok_or(OrdersServiceError::NotFound)
    }

    async fn track_orders(&self, phone: PhoneNumber) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.orders.find_by_phone(&mut tx, phone.as_str()).await?;
        let orders = self.attach_items(&mut tx, records).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_orders(&self, page: Page) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self
            .orders
            .find_recent(&mut tx, page.limit(), page.offset())
            .await?;
        let orders = self.attach_items(&mut tx, records).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_orders_for_user(&self, user: Uuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.orders.find_by_user(&mut tx, user).await?;
        let orders = self.attach_items(&mut tx, records).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self, update),
        fields(order_number = %order_number),
        err
    )]
    async fn update_status(
        &self,
        order_number: OrderNumber,
        update: StatusUpdate,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.find_by_number(&mut tx, &order_number).await?;

        let order_status = match update.order_status {
            Some(next) => current.order_status.transition(next)?,
            None => current.order_status,
        };

        let payment_status = match update.payment_status {
            Some(next) => current.payment_status.transition(next)?,
            None => current.payment_status,
        };

        let record = if (order_status, payment_status) == (current.order_status, current.payment_status) {
            current
        } else {
            let updated = self
                .orders
                .update_status(
                    &mut tx,
                    current.uuid,
                    (current.order_status, current.payment_status),
                    (order_status, payment_status),
                )
                .await?
                .ok_or(OrdersServiceError::StatusConflict)?;

            info!(
                order_status = %updated.order_status,
                payment_status = %updated.payment_status,
                "updated order status"
            );

            updated
        };

        let order = self.attach_items(&mut tx, vec![record]).await?;

        tx.commit().await?;

        order.into_iter().next().ok_or(OrdersServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price a validated checkout against current catalog and coupon state.
    /// Nothing is written.
    async fn assemble_order(&self, checkout: ValidatedCheckout) -> Result<OrderDraft, OrdersServiceError>;

    /// Atomically take stock, charge the coupon and write the order.
    async fn commit_order(&self, draft: OrderDraft) -> Result<PlacedOrder, OrdersServiceError>;

    /// Validate, assemble and commit a checkout, re-assembling once when the
    /// commit loses a stock race.
    async fn place_order(&self, request: CheckoutRequest) -> Result<PlacedOrder, OrdersServiceError>;

    /// Retrieve a single order with its items.
    async fn get_order(&self, order_number: OrderNumber) -> Result<Order, OrdersServiceError>;

    /// Orders placed with a phone number, newest first.
    async fn track_orders(&self, phone: PhoneNumber) -> Result<Vec<Order>, OrdersServiceError>;

    /// Most recent orders, newest first.
    async fn list_orders(&self, page: Page) -> Result<Vec<Order>, OrdersServiceError>;

    /// Orders placed by a signed-in customer, newest first.
    async fn list_orders_for_user(&self, user: Uuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order along its status graph.
    async fn update_status(
        &self,
        order_number: OrderNumber,
        update: StatusUpdate,
    ) -> Result<Order, OrdersServiceError>;
}

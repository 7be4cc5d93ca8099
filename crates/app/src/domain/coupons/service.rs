//! Coupons service.

use async_trait::async_trait;
use bazaar::coupons::{Coupon, CouponCode, CouponError, EvaluatedCoupon, evaluate};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, info};

use crate::{
    database::Db,
    domain::coupons::{
        data::NewCoupon, errors::CouponsServiceError, records::CouponRecord,
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, coupon_code = %coupon.code),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %created.uuid, "created coupon");

        Ok(created)
    }

    async fn get_coupon(&self, code: CouponCode) -> Result<Coupon, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .find_coupon_by_code(&mut tx, &code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record.into())
    }

    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self, code),
        fields(subtotal, discount = tracing::field::Empty)
    )]
    async fn validate_coupon(
        &self,
        code: String,
        subtotal: u64,
    ) -> Result<EvaluatedCoupon, CouponsServiceError> {
        // A code that cannot be parsed cannot exist.
        let Ok(code) = CouponCode::parse(&code) else {
            return Err(CouponError::NotFound.into());
        };

        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .find_coupon_by_code(&mut tx, &code)
            .await?
            .map(Coupon::from);

        tx.commit().await?;

        let evaluated = evaluate(coupon.as_ref(), subtotal, Timestamp::now())
            .inspect_err(|reason| debug!(reason = reason.reason_code(), "coupon rejected"))?;

        Span::current().record("discount", evaluated.discount);

        Ok(evaluated)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Creates a coupon. Codes are unique regardless of case.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve a coupon by code, ignoring case.
    async fn get_coupon(&self, code: CouponCode) -> Result<Coupon, CouponsServiceError>;

    /// Evaluate a coupon against a subtotal without charging a use.
    async fn validate_coupon(
        &self,
        code: String,
        subtotal: u64,
    ) -> Result<EvaluatedCoupon, CouponsServiceError>;
}

//! Test Helpers

use bazaar::{
    catalog::{ProductUuid, VariantUuid},
    checkout::{CheckoutRequest, LineRequest},
    coupons::{CouponCode, CouponDiscount, CouponUuid},
    customers::{CustomerInfo, PaymentInfo},
};
use jiff::{SignedDuration, Timestamp};

use crate::{
    domain::{
        catalog::{
            CatalogService, CatalogServiceError,
            data::{NewProduct, NewVariant},
            records::{ProductRecord, VariantRecord},
        },
        coupons::{CouponsService, CouponsServiceError, data::NewCoupon, records::CouponRecord},
    },
    test::TestContext,
};

pub(crate) const PHONE: &str = "01712345678";

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: u64,
    stock: u32,
) -> Result<ProductRecord, CatalogServiceError> {
    ctx.catalog
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: "Jamdani Saree".to_string(),
            price,
            stock,
            active: true,
        })
        .await
}

pub(crate) async fn create_variant(
    ctx: &TestContext,
    product: ProductUuid,
    price: Option<u64>,
    stock: u32,
) -> Result<VariantRecord, CatalogServiceError> {
    ctx.catalog
        .create_variant(NewVariant {
            uuid: VariantUuid::new(),
            product,
            name: "Red".to_string(),
            price,
            stock,
            active: true,
        })
        .await
}

/// A coupon valid from an hour ago until tomorrow.
pub(crate) async fn create_coupon(
    ctx: &TestContext,
    code: &str,
    discount: CouponDiscount,
    min_purchase: Option<u64>,
    usage_limit: Option<u32>,
) -> Result<CouponRecord, CouponsServiceError> {
    let now = Timestamp::now();

    let code = CouponCode::parse(code).map_err(|_| CouponsServiceError::InvalidData)?;

    ctx.coupons
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code,
            discount,
            min_purchase,
            valid_from: now - SignedDuration::from_hours(1),
            valid_to: now + SignedDuration::from_hours(24),
            usage_limit,
            active: true,
        })
        .await
}

pub(crate) fn line(product: ProductUuid, quantity: u32) -> LineRequest {
    LineRequest {
        product,
        variant: None,
        quantity,
    }
}

pub(crate) fn variant_line(product: ProductUuid, variant: VariantUuid, quantity: u32) -> LineRequest {
    LineRequest {
        product,
        variant: Some(variant),
        quantity,
    }
}

/// A cash-on-delivery checkout for [`PHONE`].
pub(crate) fn checkout(items: Vec<LineRequest>) -> CheckoutRequest {
    CheckoutRequest {
        customer: CustomerInfo {
            name: "Rahima Akter".to_string(),
            phone: PHONE.to_string(),
            address: "House 12, Road 5, Dhanmondi, Dhaka".to_string(),
            email: None,
        },
        payment: PaymentInfo::cash_on_delivery(),
        items,
        coupon_code: None,
        user_id: None,
        idempotency_key: None,
    }
}

pub(crate) async fn stock_of(ctx: &TestContext, product: ProductUuid) -> Result<u32, CatalogServiceError> {
    Ok(ctx.catalog.get_product(product).await?.stock)
}

//! Checkout
//!
//! Turns a submitted checkout into an [`OrderDraft`]: input validation first,
//! then re-pricing and stock checks against a [`CatalogSnapshot`], then coupon
//! re-evaluation against the fresh subtotal. Nothing here has side effects.

use jiff::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{CatalogSnapshot, LineKey, ProductUuid, VariantUuid},
    coupons::{self, Coupon, CouponCode, CouponError},
    customers::{Customer, CustomerInfo, Payment, PaymentInfo, ValidationErrors},
    orders::{AppliedCoupon, DraftItem, DraftParts, IdempotencyKey, OrderDraft, OrderNumber},
    pricing,
};

/// One requested line: ids and quantity only. Any price sent alongside is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    /// Requested product.
    #[serde(rename = "productId")]
    pub product: ProductUuid,

    /// Requested variant of the product, if any.
    #[serde(rename = "variantId", default)]
    pub variant: Option<VariantUuid>,

    /// Requested quantity; zero is rejected at validation.
    pub quantity: u32,
}

impl LineRequest {
    /// Identity of this line.
    pub const fn key(&self) -> LineKey {
        LineKey {
            product: self.product,
            variant: self.variant,
        }
    }
}

/// A checkout as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Contact and delivery details.
    pub customer: CustomerInfo,
    /// Payment method and reference.
    pub payment: PaymentInfo,
    /// Requested lines; duplicates are merged.
    pub items: Vec<LineRequest>,
    /// Coupon code, matched ignoring case.
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Signed-in customer, absent for guest checkout.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Client-generated key that makes resubmission safe.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// A coupon code as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmittedCoupon {
    Code(CouponCode),

    /// Not a well-formed code, so no coupon can carry it.
    Unknown,
}

/// A checkout whose input passed validation. Lines are merged by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    customer: Customer,
    payment: Payment,
    lines: Vec<(LineKey, u32)>,
    coupon: Option<SubmittedCoupon>,
    user: Option<Uuid>,
    idempotency_key: Option<IdempotencyKey>,
}

impl ValidatedCheckout {
    /// Validated customer contact details.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Requested lines with their merged quantities, in submission order.
    pub fn lines(&self) -> &[(LineKey, u32)] {
        &self.lines
    }

    /// Keys of the requested lines.
    pub fn line_keys(&self) -> impl Iterator<Item = LineKey> + '_ {
        self.lines.iter().map(|(key, _)| *key)
    }

    /// The coupon code to look up, if a well-formed one was submitted.
    pub fn coupon_code(&self) -> Option<&CouponCode> {
        match &self.coupon {
            Some(SubmittedCoupon::Code(code)) => Some(code),
            Some(SubmittedCoupon::Unknown) | None => None,
        }
    }

    /// Client-generated deduplication key, if any.
    pub fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        self.idempotency_key.as_ref()
    }
}

impl CheckoutRequest {
    /// Validate every input field without touching the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every failing field.
    pub fn validate(&self) -> Result<ValidatedCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer = self.customer.validate(&mut errors);
        let payment = self.payment.validate(&mut errors);
        let lines = merge_lines(&self.items, &mut errors);

        // A malformed code is reported at assembly as an unknown coupon.
        let coupon = match self.coupon_code.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(
                CouponCode::parse(code).map_or(SubmittedCoupon::Unknown, SubmittedCoupon::Code),
            ),
        };

        let idempotency_key = match self.idempotency_key.as_deref() {
            None => Some(None),
            Some(key) => IdempotencyKey::parse(key)
                .inspect_err(|err| errors.push("idempotencyKey", err.to_string()))
                .ok()
                .map(Some),
        };

        match (customer, payment, idempotency_key) {
            (Some(customer), Some(payment), Some(idempotency_key)) if errors.is_empty() => {
                Ok(ValidatedCheckout {
                    customer,
                    payment,
                    lines,
                    coupon,
                    user: self.user_id,
                    idempotency_key,
                })
            }
            _ => Err(errors),
        }
    }
}

fn merge_lines(items: &[LineRequest], errors: &mut ValidationErrors) -> Vec<(LineKey, u32)> {
    if items.is_empty() {
        errors.push("items", "must contain at least one item");
    }

    let mut lines: Vec<(LineKey, u32)> = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        if item.quantity == 0 {
            errors.push(format!("items[{index}].quantity"), "must be at least 1");
            continue;
        }

        let key = item.key();

        match lines.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, quantity)) => match quantity.checked_add(item.quantity) {
                Some(merged) => *quantity = merged,
                None => errors.push(format!("items[{index}].quantity"), "is too large"),
            },
            None => lines.push((key, item.quantity)),
        }
    }

    lines
}

/// Reasons a validated checkout cannot become an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// The line's product or variant is missing, inactive or mismatched.
    #[error("{line} is no longer available")]
    ProductUnavailable {
        /// Offending line.
        line: LineKey,
    },

    /// The line asks for more than is in stock.
    #[error("only {available} left of {line}, {requested} requested")]
    InsufficientStock {
        /// Offending line.
        line: LineKey,
        /// Quantity asked for.
        requested: u32,
        /// Quantity that can still be sold.
        available: u32,
    },

    /// The coupon does not apply to the re-priced subtotal.
    #[error("coupon cannot be applied: {0}")]
    CouponInvalid(#[source] CouponError),

    /// Amounts do not fit in the money type.
    #[error("order amount is too large")]
    AmountOverflow,
}

impl AssemblyError {
    /// Machine-readable reason code.
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::CouponInvalid(_) => "COUPON_INVALID",
            Self::AmountOverflow => "INVALID_INPUT",
        }
    }
}

impl From<pricing::PricingError> for AssemblyError {
    fn from(_: pricing::PricingError) -> Self {
        Self::AmountOverflow
    }
}

/// Price a validated checkout against authoritative catalog records.
///
/// `coupon` is the record found for the checkout's coupon code, if any; it is
/// ignored when no code was submitted.
///
/// # Errors
///
/// Returns an [`AssemblyError`] for the first line that is unavailable or
/// short of stock, or when the coupon does not apply to the re-priced
/// subtotal.
pub fn assemble<R: Rng + ?Sized>(
    checkout: &ValidatedCheckout,
    catalog: &CatalogSnapshot,
    coupon: Option<&Coupon>,
    now: Timestamp,
    rng: &mut R,
) -> Result<OrderDraft, AssemblyError> {
    let mut items = Vec::with_capacity(checkout.lines.len());

    for &(line, requested) in &checkout.lines {
        let resolved = catalog
            .resolve(line)
            .ok_or(AssemblyError::ProductUnavailable { line })?;

        if requested > resolved.available {
            return Err(AssemblyError::InsufficientStock {
                line,
                requested,
                available: resolved.available,
            });
        }

        items.push(DraftItem {
            key: line,
            name: resolved.name,
            quantity: requested,
            unit_price: resolved.unit_price,
            line_total: pricing::line_total(resolved.unit_price, requested)?,
        });
    }

    let subtotal = pricing::subtotal(items.iter().map(|item| item.line_total))?;

    let applied = checkout
        .coupon
        .as_ref()
        .map(|submitted| match submitted {
            SubmittedCoupon::Code(_) => coupons::evaluate(coupon, subtotal, now),
            SubmittedCoupon::Unknown => Err(CouponError::NotFound),
        })
        .transpose()
        .map_err(AssemblyError::CouponInvalid)?
        .map(AppliedCoupon::from);

    OrderDraft::new(DraftParts {
        order_number: OrderNumber::generate(now, rng),
        customer: checkout.customer.clone(),
        payment: checkout.payment.clone(),
        user: checkout.user,
        items,
        subtotal,
        coupon: applied,
        idempotency_key: checkout.idempotency_key.clone(),
        created_at: now,
    })
    .ok_or(AssemblyError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        catalog::{CatalogProduct, CatalogVariant},
        coupons::{CouponDiscount, CouponUuid},
        customers::PaymentMethod,
    };

    use super::*;

    fn request(items: Vec<LineRequest>) -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                name: "Karim".to_string(),
                phone: "01712345678".to_string(),
                address: "Mirpur 10, Dhaka".to_string(),
                email: None,
            },
            payment: PaymentInfo::cash_on_delivery(),
            items,
            coupon_code: None,
            user_id: None,
            idempotency_key: None,
        }
    }

    fn line(product: ProductUuid, quantity: u32) -> LineRequest {
        LineRequest {
            product,
            variant: None,
            quantity,
        }
    }

    fn product(price: u64, stock: u32) -> CatalogProduct {
        CatalogProduct {
            uuid: ProductUuid::new(),
            name: "Lungi".to_string(),
            price,
            stock,
            active: true,
        }
    }

    fn now() -> TestResult<Timestamp> {
        Ok("2024-06-01T10:00:00Z".parse()?)
    }

    fn flat_coupon(amount: u64) -> TestResult<Coupon> {
        let now = now()?;

        Ok(Coupon {
            uuid: CouponUuid::new(),
            code: CouponCode::parse("FLAT")?,
            discount: CouponDiscount::Fixed { amount },
            min_purchase: None,
            valid_from: now,
            valid_to: now,
            usage_limit: None,
            usage_count: 0,
            active: true,
        })
    }

    #[test]
    fn validate_merges_duplicate_lines() -> TestResult {
        let product = ProductUuid::new();
        let checkout = request(vec![line(product, 1), line(product, 2)]).validate()?;

        assert_eq!(checkout.lines(), &[(LineKey::product(product), 3)]);

        Ok(())
    }

    #[test]
    fn validate_collects_line_and_key_errors() {
        let mut request = request(vec![line(ProductUuid::new(), 0)]);
        request.coupon_code = Some("NOT A CODE".to_string());
        request.idempotency_key = Some(String::new());

        let errors = request.validate().err().unwrap_or_default();

        assert!(errors.contains("items[0].quantity"));
        assert!(errors.contains("idempotencyKey"));
        assert!(!errors.contains("couponCode"), "malformed codes are not input errors");
    }

    #[test]
    fn malformed_coupon_code_is_reported_as_not_found() -> TestResult {
        let product = product(300, 5);
        let mut request = request(vec![line(product.uuid, 1)]);
        request.coupon_code = Some("NOT A CODE".to_string());

        let checkout = request.validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);
        let coupon = flat_coupon(100)?;

        assert_eq!(checkout.coupon_code(), None);

        let result = assemble(&checkout, &catalog, Some(&coupon), now()?, &mut StdRng::seed_from_u64(1));

        assert_eq!(result, Err(AssemblyError::CouponInvalid(CouponError::NotFound)));
        assert_eq!(result.err().map(|err| err.reason_code()), Some("COUPON_INVALID"));

        Ok(())
    }

    #[test]
    fn validate_rejects_empty_cart() {
        let errors = request(vec![]).validate().err().unwrap_or_default();

        assert!(errors.contains("items"));
    }

    #[test]
    fn blank_coupon_code_means_no_coupon() -> TestResult {
        let mut request = request(vec![line(ProductUuid::new(), 1)]);
        request.coupon_code = Some("  ".to_string());

        assert_eq!(request.validate()?.coupon_code(), None);

        Ok(())
    }

    #[test]
    fn assemble_reprices_from_catalog() -> TestResult {
        let product = product(500, 10);
        let checkout = request(vec![line(product.uuid, 2)]).validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);

        let draft = assemble(&checkout, &catalog, None, now()?, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(draft.subtotal(), 1000);
        assert_eq!(draft.discount(), 0);
        assert_eq!(draft.total(), 1000);
        assert_eq!(draft.items().first().map(|item| item.unit_price), Some(500));
        assert_eq!(draft.payment().method(), PaymentMethod::Cod);

        Ok(())
    }

    #[test]
    fn assemble_uses_variant_price_and_stock() -> TestResult {
        let product = product(500, 0);
        let variant = CatalogVariant {
            uuid: VariantUuid::new(),
            product: product.uuid,
            name: "Blue".to_string(),
            price: Some(700),
            stock: 2,
            active: true,
        };

        let checkout = request(vec![LineRequest {
            product: product.uuid,
            variant: Some(variant.uuid),
            quantity: 2,
        }])
        .validate()?;

        let catalog = CatalogSnapshot::from_records([product], [variant]);
        let draft = assemble(&checkout, &catalog, None, now()?, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(draft.total(), 1400);

        Ok(())
    }

    #[test]
    fn assemble_reports_unavailable_line() -> TestResult {
        let missing = ProductUuid::new();
        let checkout = request(vec![line(missing, 1)]).validate()?;

        let result = assemble(
            &checkout,
            &CatalogSnapshot::new(),
            None,
            now()?,
            &mut StdRng::seed_from_u64(1),
        );

        assert_eq!(
            result,
            Err(AssemblyError::ProductUnavailable {
                line: LineKey::product(missing)
            })
        );

        Ok(())
    }

    #[test]
    fn assemble_reports_available_stock() -> TestResult {
        let product = product(500, 3);
        let key = LineKey::product(product.uuid);
        let checkout = request(vec![line(product.uuid, 4)]).validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);

        let result = assemble(&checkout, &catalog, None, now()?, &mut StdRng::seed_from_u64(1));

        assert_eq!(
            result,
            Err(AssemblyError::InsufficientStock {
                line: key,
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(result.err().map(|err| err.reason_code()), Some("INSUFFICIENT_STOCK"));

        Ok(())
    }

    #[test]
    fn assemble_applies_coupon_and_clamps_fixed_discount() -> TestResult {
        let product = product(300, 5);
        let mut request = request(vec![line(product.uuid, 1)]);
        request.coupon_code = Some("flat".to_string());

        let checkout = request.validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);
        let coupon = flat_coupon(1000)?;

        let draft = assemble(&checkout, &catalog, Some(&coupon), now()?, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(draft.discount(), 300);
        assert_eq!(draft.total(), 0);
        assert_eq!(draft.coupon().map(|coupon| coupon.code.as_str()), Some("FLAT"));

        Ok(())
    }

    #[test]
    fn assemble_surfaces_coupon_sub_reason() -> TestResult {
        let product = product(300, 5);
        let mut request = request(vec![line(product.uuid, 1)]);
        request.coupon_code = Some("GONE".to_string());

        let checkout = request.validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);

        let result = assemble(&checkout, &catalog, None, now()?, &mut StdRng::seed_from_u64(1));

        assert_eq!(result, Err(AssemblyError::CouponInvalid(CouponError::NotFound)));

        Ok(())
    }

    #[test]
    fn coupon_record_is_ignored_without_a_code() -> TestResult {
        let product = product(300, 5);
        let checkout = request(vec![line(product.uuid, 1)]).validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);
        let coupon = flat_coupon(100)?;

        let draft = assemble(&checkout, &catalog, Some(&coupon), now()?, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(draft.discount(), 0);
        assert!(draft.coupon().is_none());

        Ok(())
    }

    #[test]
    fn stock_decrements_are_sorted() -> TestResult {
        let first = product(100, 5);
        let second = product(100, 5);
        let (low, high) = if first.uuid < second.uuid {
            (first.uuid, second.uuid)
        } else {
            (second.uuid, first.uuid)
        };

        let checkout = request(vec![line(high, 1), line(low, 2)]).validate()?;
        let catalog = CatalogSnapshot::from_records([first, second], []);
        let draft = assemble(&checkout, &catalog, None, now()?, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(
            draft.stock_decrements(),
            vec![(LineKey::product(low), 2), (LineKey::product(high), 1)]
        );

        Ok(())
    }

    #[test]
    fn percentage_coupon_uses_server_subtotal() -> TestResult {
        let product = product(2500, 5);
        let mut request = request(vec![line(product.uuid, 2)]);
        request.coupon_code = Some("TEN".to_string());

        let now = now()?;
        let coupon = Coupon {
            code: CouponCode::parse("TEN")?,
            discount: CouponDiscount::Percentage {
                percent: Decimal::TEN,
                max_discount: None,
            },
            ..flat_coupon(1)?
        };

        let checkout = request.validate()?;
        let catalog = CatalogSnapshot::from_records([product], []);
        let draft = assemble(&checkout, &catalog, Some(&coupon), now, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(draft.subtotal(), 5000);
        assert_eq!(draft.discount(), 500);
        assert_eq!(draft.total(), 4500);

        Ok(())
    }
}

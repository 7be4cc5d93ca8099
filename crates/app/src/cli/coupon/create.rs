use bazaar::coupons::{CouponCode, CouponDiscount, CouponUuid};
use bazaar_app::domain::coupons::{CouponsService, PgCouponsService, data::NewCoupon};
use clap::{Args, ValueEnum};
use jiff::Timestamp;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Code customers enter at checkout (case-insensitive)
    #[arg(long)]
    code: String,

    #[arg(long, value_enum)]
    kind: DiscountKind,

    /// Percentage off, for percentage coupons (e.g. `10` or `12.5`)
    #[arg(long, required_if_eq("kind", "percentage"))]
    percent: Option<Decimal>,

    /// Cap on a percentage discount
    #[arg(long)]
    max_discount: Option<u64>,

    /// Amount off, for fixed coupons
    #[arg(long, required_if_eq("kind", "fixed"))]
    amount: Option<u64>,

    /// Minimum subtotal the coupon applies to
    #[arg(long)]
    min_purchase: Option<u64>,

    /// Start of validity (RFC 3339); defaults to now
    #[arg(long)]
    valid_from: Option<Timestamp>,

    /// End of validity (RFC 3339)
    #[arg(long)]
    valid_to: Timestamp,

    /// Maximum number of orders that may use the coupon
    #[arg(long)]
    usage_limit: Option<u32>,

    /// Create the coupon switched off
    #[arg(long)]
    inactive: bool,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let code = CouponCode::parse(&args.code).map_err(|error| format!("invalid code: {error}"))?;

    let discount = match args.kind {
        DiscountKind::Percentage => CouponDiscount::Percentage {
            percent: args.percent.ok_or("--percent is required for percentage coupons")?,
            max_discount: args.max_discount,
        },
        DiscountKind::Fixed => CouponDiscount::Fixed {
            amount: args.amount.ok_or("--amount is required for fixed coupons")?,
        },
    };

    let service = PgCouponsService::new(crate::cli::connect(&args.database_url).await?);

    let coupon = service
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code,
            discount,
            min_purchase: args.min_purchase,
            valid_from: args.valid_from.unwrap_or_else(Timestamp::now),
            valid_to: args.valid_to,
            usage_limit: args.usage_limit,
            active: !args.inactive,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("code: {}", coupon.code);
    println!("kind: {}", coupon.discount.kind());
    println!("valid: {} .. {}", coupon.valid_from, coupon.valid_to);

    if let Some(limit) = coupon.usage_limit {
        println!("usage_limit: {limit}");
    }

    Ok(())
}

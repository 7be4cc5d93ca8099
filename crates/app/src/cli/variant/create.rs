use bazaar::catalog::{ProductUuid, VariantUuid};
use bazaar_app::domain::catalog::{CatalogService, PgCatalogService, data::NewVariant};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateVariantArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Product the variant belongs to
    #[arg(long)]
    product_uuid: ProductUuid,

    /// Display name, e.g. a size or colour
    #[arg(long)]
    name: String,

    /// Price override; the product price applies when omitted
    #[arg(long)]
    price: Option<u64>,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Create the variant hidden from checkout
    #[arg(long)]
    inactive: bool,
}

pub(crate) async fn run(args: CreateVariantArgs) -> Result<(), String> {
    let service = PgCatalogService::new(crate::cli::connect(&args.database_url).await?);

    let variant = service
        .create_variant(NewVariant {
            uuid: VariantUuid::new(),
            product: args.product_uuid,
            name: args.name,
            price: args.price,
            stock: args.stock,
            active: !args.inactive,
        })
        .await
        .map_err(|error| format!("failed to create variant: {error}"))?;

    println!("variant_uuid: {}", variant.uuid);
    println!("product_uuid: {}", variant.product_uuid);

    if let Some(price) = variant.price {
        println!("price: {price}");
    }

    println!("stock: {}", variant.stock);

    Ok(())
}

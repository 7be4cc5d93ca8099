use bazaar::catalog::ProductUuid;
use bazaar_app::domain::catalog::{CatalogService, PgCatalogService, data::NewProduct};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Unit price in whole currency units
    #[arg(long)]
    price: u64,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Create the product hidden from checkout
    #[arg(long)]
    inactive: bool,
}

pub(crate) async fn run(args: CreateProductArgs) -> Result<(), String> {
    let service = PgCatalogService::new(crate::cli::connect(&args.database_url).await?);

    let product = service
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: args.name,
            price: args.price,
            stock: args.stock,
            active: !args.inactive,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("price: {}", product.price);
    println!("stock: {}", product.stock);
    println!("active: {}", product.active);

    Ok(())
}

use bazaar::catalog::ProductUuid;
use bazaar_app::domain::catalog::{CatalogService, PgCatalogService};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct SetPriceArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Product to reprice
    #[arg(long)]
    product_uuid: ProductUuid,

    /// New unit price in whole currency units
    #[arg(long)]
    price: u64,
}

pub(crate) async fn run(args: SetPriceArgs) -> Result<(), String> {
    let service = PgCatalogService::new(crate::cli::connect(&args.database_url).await?);

    let product = service
        .update_product_price(args.product_uuid, args.price)
        .await
        .map_err(|error| format!("failed to update price: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("price: {}", product.price);

    Ok(())
}

use bazaar_app::database::{self, Db};
use clap::{Parser, Subcommand};

mod coupon;
mod db;
mod product;
mod staff_token;
mod variant;

#[derive(Debug, Parser)]
#[command(name = "bazaar-app", about = "Bazaar administration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Product(product::ProductCommand),
    Variant(variant::VariantCommand),
    Coupon(coupon::CouponCommand),
    StaffToken(staff_token::StaffTokenCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Product(command) => product::run(command).await,
            Commands::Variant(command) => variant::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::StaffToken(command) => staff_token::run(command).await,
        }
    }
}

async fn connect(database_url: &str) -> Result<Db, String> {
    database::connect(database_url, 2)
        .await
        .map(Db::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}

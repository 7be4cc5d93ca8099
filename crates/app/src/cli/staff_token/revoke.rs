use bazaar_app::domain::staff::{PgStaffService, StaffServiceError, records::StaffTokenUuid};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct RevokeStaffTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Token UUID to revoke
    #[arg(long)]
    token_uuid: StaffTokenUuid,
}

pub(crate) async fn run(args: RevokeStaffTokenArgs) -> Result<(), String> {
    let service = PgStaffService::new(crate::cli::connect(&args.database_url).await?);

    match service.revoke_token(args.token_uuid).await {
        Ok(record) => println!("revoked token {}", record.uuid),
        Err(StaffServiceError::NotFound) => println!("token {} was not active", args.token_uuid),
        Err(error) => return Err(format!("failed to revoke token: {error}")),
    }

    Ok(())
}

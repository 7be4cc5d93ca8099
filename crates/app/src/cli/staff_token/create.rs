use bazaar_app::domain::staff::PgStaffService;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateStaffTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Who or what the token is for
    #[arg(long)]
    label: String,
}

pub(crate) async fn run(args: CreateStaffTokenArgs) -> Result<(), String> {
    let service = PgStaffService::new(crate::cli::connect(&args.database_url).await?);

    let issued = service
        .issue_token(&args.label)
        .await
        .map_err(|error| format!("failed to create staff token: {error}"))?;

    println!("token_uuid: {}", issued.record.uuid);
    println!("label: {}", issued.record.label);
    println!("token_created_at: {}", issued.record.created_at);
    println!("staff_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}

use clap::{Args, Subcommand};

mod create;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct StaffTokenCommand {
    #[command(subcommand)]
    command: StaffTokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum StaffTokenSubcommand {
    Create(create::CreateStaffTokenArgs),
    Revoke(revoke::RevokeStaffTokenArgs),
}

pub(crate) async fn run(command: StaffTokenCommand) -> Result<(), String> {
    match command.command {
        StaffTokenSubcommand::Create(args) => create::run(args).await,
        StaffTokenSubcommand::Revoke(args) => revoke::run(args).await,
    }
}

mod header;
mod status;
mod tenant;
mod token;

use crate::cli::Commands;
use crate::context::AppContext;

pub async fn dispatch(command: &Commands, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Commands::Token => token::handle(ctx).await,
        Commands::Header => header::handle(ctx).await,
        Commands::Tenant(args) => tenant::handle(args, ctx).await,
        Commands::Status => status::handle(ctx),
    }
}

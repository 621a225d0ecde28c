use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("adocred error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();

    let config = ado_config::AdoConfig::load_with_dotenv()?;
    init_tracing(flags.quiet, flags.verbose, config.general.log_filter())?;

    let ctx = context::AppContext::new(config, flags);
    commands::dispatch(&cli.command, &ctx).await
}

/// `ADO_LOG` wins, then `--quiet` / `--verbose`, then the configured filter.
fn init_tracing(quiet: bool, verbose: bool, configured: Option<&str>) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        configured.unwrap_or("warn")
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ADO_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .map_err(|error| anyhow::anyhow!("invalid log filter '{level}': {error}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

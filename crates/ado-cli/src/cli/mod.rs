use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{Commands, TenantArgs};

/// Top-level CLI parser for the `adocred` binary.
#[derive(Debug, Parser)]
#[command(
    name = "adocred",
    version,
    about = "Azure DevOps credentials and organization tenants"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credential backend: pat, azcli, env, interactive
    #[arg(short, long, global = true)]
    pub authentication: Option<String>,

    /// Entra tenant id to authenticate against
    #[arg(short, long, global = true)]
    pub tenant: Option<String>,

    /// Azure DevOps organization (used to look up its tenant)
    #[arg(short, long, global = true)]
    pub organization: Option<String>,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            authentication: self.authentication.clone(),
            tenant: self.tenant.clone(),
            organization: self.organization.clone(),
        }
    }
}

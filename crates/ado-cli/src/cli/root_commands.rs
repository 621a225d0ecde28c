use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Acquire a token with the selected backend.
    Token,
    /// Print the Authorization header value for the selected backend.
    Header,
    /// Resolve the Entra tenant that owns an organization.
    Tenant(TenantArgs),
    /// Show the effective settings.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct TenantArgs {
    /// Organization name (defaults to --organization / configured organization)
    pub organization: Option<String>,
}

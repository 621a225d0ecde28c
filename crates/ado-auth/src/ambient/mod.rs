//! Ambient credential chain.
//!
//! Probes locally available identity contexts without user interaction:
//! a service principal in the environment, a managed identity, or a signed-in
//! Azure CLI / Azure Developer CLI session. The first source that yields a
//! token wins.
//!
//! Source order is an explicit [`ChainPreference`] handed to the chain
//! builder; nothing here mutates process environment.

mod azure_cli;
mod azure_developer_cli;
mod environment;
mod managed_identity;
mod process;

pub use azure_cli::AzureCliCredential;
pub use azure_developer_cli::AzureDeveloperCliCredential;
pub use environment::{ClientSecretSettings, EnvironmentCredential};
pub use managed_identity::ManagedIdentityCredential;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::authenticator::{AuthKind, Authenticator};
use crate::error::AuthError;
use crate::factory::AuthOptions;
use crate::oauth::AccessToken;

/// Environment variable that narrows the default chain (`dev` / `prod`).
/// Read only; never written.
pub const TOKEN_CREDENTIALS_ENV: &str = "AZURE_TOKEN_CREDENTIALS";

/// One source of ambient tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in logs and chain-exhaustion errors.
    fn name(&self) -> &'static str;

    /// Acquire a token for `scope` (`<resource>/.default`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when this source has no usable identity.
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError>;
}

/// Which group of sources the default chain probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPreference {
    /// Deployed-service sources, then developer sources.
    #[default]
    All,
    /// Developer tooling only (Azure CLI, Azure Developer CLI).
    Developer,
    /// Deployed-service sources only (environment service principal, managed identity).
    Production,
}

impl ChainPreference {
    /// Read [`TOKEN_CREDENTIALS_ENV`]; unset means [`ChainPreference::All`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(TOKEN_CREDENTIALS_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") => Self::All,
            Some("dev") => Self::Developer,
            Some("prod") => Self::Production,
            Some(other) => {
                tracing::warn!(
                    value = other,
                    "unrecognized {TOKEN_CREDENTIALS_ENV} value; probing all credential sources"
                );
                Self::All
            }
        }
    }

    const fn includes_production(self) -> bool {
        matches!(self, Self::All | Self::Production)
    }

    const fn includes_developer(self) -> bool {
        matches!(self, Self::All | Self::Developer)
    }
}

/// Tries each source in order and returns the first token.
pub struct ChainedTokenCredential {
    sources: Vec<Box<dyn TokenCredential>>,
}

impl ChainedTokenCredential {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    /// The default chain for `preference`.
    #[must_use]
    pub fn default_chain(preference: ChainPreference, options: &AuthOptions) -> Self {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();
        if preference.includes_production() {
            sources.push(Box::new(EnvironmentCredential::from_env(
                &options.authority_host,
            )));
            sources.push(Box::new(ManagedIdentityCredential::new()));
        }
        if preference.includes_developer() {
            sources.push(Box::new(AzureCliCredential::new(None)));
            sources.push(Box::new(AzureDeveloperCliCredential::new(None)));
        }
        Self::new(sources)
    }

    /// Put `source` ahead of every existing source.
    pub fn prepend(&mut self, source: Box<dyn TokenCredential>) {
        self.sources.insert(0, source);
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl TokenCredential for ChainedTokenCredential {
    fn name(&self) -> &'static str {
        "ChainedTokenCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) if token.token.is_empty() => {
                    tracing::debug!(source = source.name(), "credential source returned an empty token");
                    failures.push(format!("{}: empty access token", source.name()));
                }
                Ok(token) => {
                    tracing::debug!(source = source.name(), "ambient credential acquired");
                    return Ok(token);
                }
                Err(error) => {
                    tracing::debug!(source = source.name(), %error, "credential source unavailable");
                    failures.push(format!("{}: {error}", source.name()));
                }
            }
        }

        let details = if failures.is_empty() {
            "no credential sources configured".to_string()
        } else {
            failures.join("; ")
        };
        Err(AuthError::CredentialUnavailable { details })
    }
}

/// Ambient backend: the chain plus a single cached token.
pub struct AmbientAuthenticator {
    chain: ChainedTokenCredential,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl AmbientAuthenticator {
    /// Build the chain for `preference`, with a tenant-scoped Azure CLI
    /// source first when `tenant_hint` is given.
    #[must_use]
    pub fn new(preference: ChainPreference, tenant_hint: Option<&str>, options: &AuthOptions) -> Self {
        let mut chain = ChainedTokenCredential::default_chain(preference, options);
        if let Some(tenant) = tenant_hint {
            chain.prepend(Box::new(AzureCliCredential::new(Some(tenant.to_string()))));
        }
        Self::from_chain(chain, options.scope.clone())
    }

    #[must_use]
    pub fn from_chain(chain: ChainedTokenCredential, scope: String) -> Self {
        Self {
            chain,
            scope,
            cached: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.chain.source_names()
    }
}

#[async_trait]
impl Authenticator for AmbientAuthenticator {
    fn kind(&self) -> AuthKind {
        AuthKind::Ambient
    }

    async fn get_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.token.clone());
        }

        let token = self.chain.get_token(&self.scope).await?;
        let raw = token.token.clone();
        *cached = Some(token);
        Ok(raw)
    }
}

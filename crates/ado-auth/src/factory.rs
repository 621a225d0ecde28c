//! Builds the one [`Authenticator`] a process uses.

use std::sync::Arc;
use std::time::Duration;

use crate::ambient::{AmbientAuthenticator, ChainPreference};
use crate::authenticator::Authenticator;
use crate::error::AuthError;
use crate::interactive::{EntraPublicClient, InteractiveAuthenticator, PublicClientConfig};
use crate::pat::PatAuthenticator;

/// Azure DevOps resource application id with the `.default` suffix.
pub const AZURE_DEVOPS_SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798/.default";

/// Public client registered for Azure DevOps sign-in.
pub const DEFAULT_CLIENT_ID: &str = "0d50963b-7bb9-4fe7-94c7-a99af00b5136";

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Credential backend named by the selector string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `pat`
    Pat,
    /// `azcli`: developer-tool sources only.
    AzureCli,
    /// `env`: full ambient chain.
    Env,
    /// `interactive`, and any unrecognized selector.
    Interactive,
}

impl AuthMode {
    /// Total: unknown selectors mean interactive.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "pat" => Self::Pat,
            "azcli" => Self::AzureCli,
            "env" => Self::Env,
            _ => Self::Interactive,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pat => "pat",
            Self::AzureCli => "azcli",
            Self::Env => "env",
            Self::Interactive => "interactive",
        }
    }
}

/// Knobs shared by the bearer backends.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub client_id: String,
    pub authority_host: String,
    pub scope: String,
    pub login_timeout: Duration,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            scope: AZURE_DEVOPS_SCOPE.to_string(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }
}

impl AuthOptions {
    /// `{host}/{tenant}` with a hint, `{host}/common` without.
    #[must_use]
    pub fn authority(&self, tenant_hint: Option<&str>) -> String {
        let host = self.authority_host.trim_end_matches('/');
        format!("{host}/{}", tenant_hint.unwrap_or("common"))
    }
}

/// Build an authenticator from a selector string and optional tenant hint.
///
/// # Errors
///
/// Only the `pat` selector fails here, when `AZURE_DEVOPS_PAT` is unset.
/// Every other backend defers failure to the first `get_token`.
pub fn create_authenticator(
    selector: &str,
    tenant_hint: Option<&str>,
) -> Result<Arc<dyn Authenticator>, AuthError> {
    create_authenticator_with(
        AuthMode::from_selector(selector),
        tenant_hint,
        &AuthOptions::default(),
    )
}

/// [`create_authenticator`] with an explicit mode and options.
///
/// # Errors
///
/// Returns [`AuthError::MissingEnvVar`] for [`AuthMode::Pat`] without a token.
pub fn create_authenticator_with(
    mode: AuthMode,
    tenant_hint: Option<&str>,
    options: &AuthOptions,
) -> Result<Arc<dyn Authenticator>, AuthError> {
    let tenant_hint = tenant_hint.filter(|t| !t.is_empty());
    tracing::debug!(mode = mode.as_str(), tenant = tenant_hint, "creating authenticator");

    let authenticator: Arc<dyn Authenticator> = match mode {
        AuthMode::Pat => Arc::new(PatAuthenticator::from_env()?),
        AuthMode::AzureCli => Arc::new(AmbientAuthenticator::new(
            ChainPreference::Developer,
            tenant_hint,
            options,
        )),
        AuthMode::Env => Arc::new(AmbientAuthenticator::new(
            ChainPreference::from_env(),
            tenant_hint,
            options,
        )),
        AuthMode::Interactive => {
            let client = EntraPublicClient::new(PublicClientConfig {
                client_id: options.client_id.clone(),
                authority: options.authority(tenant_hint),
                scope: options.scope.clone(),
                login_timeout: options.login_timeout,
            });
            Arc::new(InteractiveAuthenticator::new(client))
        }
    };
    Ok(authenticator)
}

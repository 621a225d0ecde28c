use async_trait::async_trait;

use super::TokenCredential;
use crate::error::AuthError;
use crate::oauth::{AccessToken, request_token};

const NAME: &str = "EnvironmentCredential";

const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Service-principal secret read from the environment.
#[derive(Clone)]
pub struct ClientSecretSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientSecretSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretSettings")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ClientSecretSettings {
    /// `None` unless all three variables are set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            tenant_id: read(ENV_TENANT_ID)?,
            client_id: read(ENV_CLIENT_ID)?,
            client_secret: read(ENV_CLIENT_SECRET)?,
        })
    }
}

/// Client-credentials grant for a service principal configured through
/// `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`.
///
/// Settings are captured at construction; a missing variable makes the
/// source unavailable at `get_token` time rather than failing construction.
pub struct EnvironmentCredential {
    settings: Option<ClientSecretSettings>,
    authority_host: String,
    http: reqwest::Client,
}

impl EnvironmentCredential {
    #[must_use]
    pub fn from_env(authority_host: &str) -> Self {
        Self::new(ClientSecretSettings::from_env(), authority_host)
    }

    #[must_use]
    pub fn new(settings: Option<ClientSecretSettings>, authority_host: &str) -> Self {
        Self {
            settings,
            authority_host: authority_host.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let Some(settings) = &self.settings else {
            return Err(AuthError::SourceUnavailable {
                source_name: NAME,
                message: format!(
                    "{ENV_TENANT_ID}, {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET} must all be set"
                ),
            });
        };

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, settings.tenant_id
        );
        let response = request_token(
            &self.http,
            &url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &settings.client_id),
                ("client_secret", &settings.client_secret),
                ("scope", scope),
            ],
        )
        .await?;

        Ok(response.to_access_token())
    }
}

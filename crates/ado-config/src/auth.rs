//! Credential backend selection.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_url};

fn default_mode() -> String {
    "interactive".to_string()
}

/// Default browser sign-in timeout, in seconds.
const fn default_login_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Backend selector: `pat`, `azcli`, `env` or `interactive`.
    /// Unrecognized values select `interactive`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Entra tenant to authenticate against. Empty means resolve it from the
    /// organization, or fall back to the common authority.
    #[serde(default)]
    pub tenant: String,

    /// Public client id for interactive sign-in. Empty uses the built-in one.
    #[serde(default)]
    pub client_id: String,

    /// Identity provider host. Empty uses the public cloud.
    #[serde(default)]
    pub authority_host: String,

    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            tenant: String::new(),
            client_id: String::new(),
            authority_host: String::new(),
            login_timeout_secs: default_login_timeout_secs(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        non_empty(&self.tenant)
    }

    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    #[must_use]
    pub fn authority_host(&self) -> Option<&str> {
        non_empty(&self.authority_host)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.login_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "auth.login_timeout_secs",
                "must be greater than zero",
            ));
        }
        check_url("auth.authority_host", &self.authority_host)
    }
}

pub(crate) fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

//! # ado-config
//!
//! Layered configuration loading for `adocred` using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ADO_*` prefix, `__` as separator)
//! 2. Project-level `.ado/config.toml`
//! 3. User-level `~/.config/ado/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ADO_AUTH__MODE` -> `auth.mode`, `ADO_TENANT_CACHE__TTL_DAYS`
//! -> `tenant_cache.ttl_days`, `ADO_ORGANIZATION` -> `organization`.
//!
//! # Usage
//!
//! ```no_run
//! use ado_config::AdoConfig;
//!
//! let config = AdoConfig::load_with_dotenv().expect("config");
//! if let Some(org) = config.organization() {
//!     println!("organization: {org}");
//! }
//! ```

mod auth;
mod error;
mod general;
mod tenant_cache;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use tenant_cache::TenantCacheConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ADO_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdoConfig {
    /// Default Azure DevOps organization, used for tenant resolution.
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub tenant_cache: TenantCacheConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl AdoConfig {
    /// Load and validate configuration from all sources.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory first, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers and tests can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".ado/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values that would only fail later, deep inside a login.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        self.tenant_cache.validate()
    }

    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        auth::non_empty(&self.organization)
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ado").join("config.toml"))
    }
}

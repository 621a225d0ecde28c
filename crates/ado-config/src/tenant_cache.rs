//! Organization tenant cache settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::non_empty;
use crate::error::{ConfigError, check_url};

/// Days before a cached org → tenant mapping is revalidated.
const fn default_ttl_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantCacheConfig {
    /// Cache file location. Empty means `~/.ado_orgs.cache`.
    #[serde(default)]
    pub path: String,

    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,

    /// Base URL of the tenant probe. Empty means `https://vssps.dev.azure.com`.
    #[serde(default)]
    pub probe_base_url: String,
}

impl Default for TenantCacheConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            ttl_days: default_ttl_days(),
            probe_base_url: String::new(),
        }
    }
}

impl TenantCacheConfig {
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        non_empty(&self.path).map(PathBuf::from)
    }

    #[must_use]
    pub fn probe_base_url(&self) -> Option<&str> {
        non_empty(&self.probe_base_url)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_days == 0 {
            return Err(ConfigError::invalid(
                "tenant_cache.ttl_days",
                "must be greater than zero",
            ));
        }
        check_url("tenant_cache.probe_base_url", &self.probe_base_url)
    }
}

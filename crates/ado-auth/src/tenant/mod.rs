//! Organization → tenant resolution with a file-backed cache.
//!
//! Tenant ownership of an organization rarely changes, so a stale answer is
//! preferred to no answer: once a tenant has been observed for an org it is
//! returned whenever a fresh probe fails, however old it is.

mod cache;
mod probe;

pub use cache::{TenantCache, TenantCacheEntry, TenantMap};
pub use probe::{DEFAULT_PROBE_BASE_URL, HttpTenantProbe, TENANT_HEADER, TenantProbe};

use chrono::{TimeDelta, Utc};
use thiserror::Error;

/// Cached mappings older than this are revalidated.
pub const DEFAULT_TTL: TimeDelta = TimeDelta::days(7);

/// Resolution failures. Logged by the resolver, never returned to its callers.
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Expected status 404, got {0}")]
    UnexpectedStatus(u16),

    #[error("x-vss-resourcetenant header not found in response")]
    MissingTenantHeader,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cache error: {0}")]
    Cache(String),
}

/// Resolves organization names to tenant ids.
pub struct TenantResolver<P = HttpTenantProbe> {
    cache: TenantCache,
    probe: P,
    ttl: TimeDelta,
}

impl TenantResolver<HttpTenantProbe> {
    /// Default probe endpoint and TTL.
    #[must_use]
    pub fn new(cache: TenantCache) -> Self {
        Self::with_probe(cache, HttpTenantProbe::default())
    }
}

impl<P: TenantProbe> TenantResolver<P> {
    #[must_use]
    pub fn with_probe(cache: TenantCache, probe: P) -> Self {
        Self {
            cache,
            probe,
            ttl: DEFAULT_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &TenantCache {
        &self.cache
    }

    /// Tenant that owns `org_name`, or `None` if it has never been resolved
    /// and cannot be resolved now.
    ///
    /// Fresh cache hits skip the network. Otherwise the probe runs; success is
    /// written back (best effort), failure falls back to any cached value.
    pub async fn get_org_tenant(&self, org_name: &str) -> Option<String> {
        let mut map = self.cache.load_async().await;
        let cached = map.get(org_name).cloned();

        if let Some(entry) = &cached
            && !entry.is_expired(Utc::now(), self.ttl)
        {
            tracing::debug!(org = org_name, tenant = %entry.tenant_id, "org tenant cache hit");
            return Some(entry.tenant_id.clone());
        }

        match self.probe.fetch_tenant(org_name).await {
            Ok(tenant_id) => {
                tracing::info!(org = org_name, tenant = %tenant_id, "resolved org tenant");
                map.insert(
                    org_name.to_string(),
                    TenantCacheEntry::new(tenant_id.clone(), Utc::now()),
                );
                if let Err(error) = self.cache.save_async(map).await {
                    tracing::warn!(%error, "failed to save org tenants cache");
                }
                Some(tenant_id)
            }
            Err(error) => match cached {
                Some(entry) => {
                    tracing::warn!(
                        org = org_name,
                        %error,
                        "failed to fetch fresh tenant for ADO org, using expired cache entry"
                    );
                    Some(entry.tenant_id)
                }
                None => {
                    tracing::warn!(org = org_name, %error, "failed to fetch tenant for ADO org");
                    None
                }
            },
        }
    }
}

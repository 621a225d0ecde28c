//! Effective settings: command-line flags layered over [`AdoConfig`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ado_auth::tenant::{HttpTenantProbe, TenantCache, TenantResolver};
use ado_auth::{AuthMode, AuthOptions, Authenticator};
use ado_config::AdoConfig;
use anyhow::Context;
use chrono::TimeDelta;

use crate::cli::GlobalFlags;

pub struct AppContext {
    pub config: AdoConfig,
    pub flags: GlobalFlags,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl AppContext {
    pub const fn new(config: AdoConfig, flags: GlobalFlags) -> Self {
        Self { config, flags }
    }

    /// Selector string as given; parsing into a mode never fails.
    pub fn selector(&self) -> &str {
        self.flags
            .authentication
            .as_deref()
            .unwrap_or(&self.config.auth.mode)
    }

    pub fn mode(&self) -> AuthMode {
        AuthMode::from_selector(self.selector())
    }

    pub fn organization(&self) -> Option<&str> {
        non_empty(self.flags.organization.as_deref()).or_else(|| self.config.organization())
    }

    pub fn explicit_tenant(&self) -> Option<&str> {
        non_empty(self.flags.tenant.as_deref()).or_else(|| self.config.auth.tenant())
    }

    pub fn auth_options(&self) -> AuthOptions {
        let mut options = AuthOptions::default();
        if let Some(client_id) = self.config.auth.client_id() {
            options.client_id = client_id.to_string();
        }
        if let Some(host) = self.config.auth.authority_host() {
            options.authority_host = host.to_string();
        }
        options.login_timeout = Duration::from_secs(self.config.auth.login_timeout_secs);
        options
    }

    pub fn cache_path(&self) -> anyhow::Result<PathBuf> {
        self.config
            .tenant_cache
            .path()
            .or_else(TenantCache::default_path)
            .context("cannot locate the org tenants cache: no home directory; set ADO_TENANT_CACHE__PATH")
    }

    pub fn tenant_resolver(&self) -> anyhow::Result<TenantResolver<HttpTenantProbe>> {
        let cache = TenantCache::new(self.cache_path()?);
        let probe = self
            .config
            .tenant_cache
            .probe_base_url()
            .map_or_else(HttpTenantProbe::default, HttpTenantProbe::new);
        let ttl = TimeDelta::days(i64::from(self.config.tenant_cache.ttl_days));
        Ok(TenantResolver::with_probe(cache, probe).with_ttl(ttl))
    }

    /// Explicit tenant first; otherwise the organization's tenant for the
    /// bearer backends. `None` means the common authority.
    pub async fn tenant_hint(&self) -> anyhow::Result<Option<String>> {
        if let Some(tenant) = self.explicit_tenant() {
            return Ok(Some(tenant.to_string()));
        }
        if self.mode() == AuthMode::Pat {
            return Ok(None);
        }
        let Some(org) = self.organization() else {
            return Ok(None);
        };
        Ok(self.tenant_resolver()?.get_org_tenant(org).await)
    }

    pub async fn authenticator(&self) -> anyhow::Result<Arc<dyn Authenticator>> {
        let tenant = self.tenant_hint().await?;
        tracing::debug!(selector = self.selector(), tenant = tenant.as_deref(), "selecting backend");
        let authenticator =
            ado_auth::create_authenticator_with(self.mode(), tenant.as_deref(), &self.auth_options())?;
        Ok(authenticator)
    }
}

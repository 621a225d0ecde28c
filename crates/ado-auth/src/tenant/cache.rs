use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::TenantError;

const CACHE_FILE_NAME: &str = ".ado_orgs.cache";

/// One org → tenant mapping. `refreshed_on` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCacheEntry {
    pub tenant_id: String,
    pub refreshed_on: i64,
}

impl TenantCacheEntry {
    #[must_use]
    pub fn new(tenant_id: String, refreshed_on: DateTime<Utc>) -> Self {
        Self {
            tenant_id,
            refreshed_on: refreshed_on.timestamp_millis(),
        }
    }

    /// Expired once strictly older than `ttl`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.timestamp_millis().saturating_sub(self.refreshed_on) > ttl.num_milliseconds()
    }
}

/// Organization name → entry.
pub type TenantMap = BTreeMap<String, TenantCacheEntry>;

/// The cache file. Whole-file reads and atomic whole-file writes; no locking,
/// so concurrent writers from different processes resolve last-writer-wins.
#[derive(Debug, Clone)]
pub struct TenantCache {
    path: PathBuf,
}

impl TenantCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.ado_orgs.cache`, or `None` without a home directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CACHE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the mapping. Missing or unreadable files are an empty mapping;
    /// malformed entries are dropped individually.
    #[must_use]
    pub fn load(&self) -> TenantMap {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return TenantMap::new(),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "failed to read org tenants cache");
                return TenantMap::new();
            }
        };

        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&data) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "ignoring corrupt org tenants cache");
                return TenantMap::new();
            }
        };

        raw.into_iter()
            .filter_map(|(org, value)| match serde_json::from_value(value) {
                Ok(entry) => Some((org, entry)),
                Err(error) => {
                    tracing::warn!(org = %org, %error, "skipping malformed org tenants cache entry");
                    None
                }
            })
            .collect()
    }

    /// [`Self::load`] on the blocking thread pool.
    pub async fn load_async(&self) -> TenantMap {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.load())
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "org tenants cache read task failed");
                TenantMap::new()
            })
    }

    /// [`Self::save`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`Self::save`], plus [`TenantError::Cache`] if the task fails.
    pub async fn save_async(&self, map: TenantMap) -> Result<(), TenantError> {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.save(&map))
            .await
            .map_err(|e| TenantError::Cache(format!("write task for {}: {e}", self.path.display())))?
    }

    /// Replace the file with `map`: write a sibling temp file, then rename it
    /// over the cache so readers never see a partial write.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::Cache`] if the directory, temp file, or rename fails.
    pub fn save(&self, map: &TenantMap) -> Result<(), TenantError> {
        let cache_err = |action: &str, e: &dyn std::fmt::Display| {
            TenantError::Cache(format!("{action} {}: {e}", self.path.display()))
        };

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| cache_err("mkdir for", &e))?;

        let json = serde_json::to_string_pretty(map).map_err(|e| cache_err("serialize", &e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| cache_err("temp file for", &e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| cache_err("write", &e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| cache_err("sync", &e))?;
        tmp.persist(&self.path)
            .map_err(|e| cache_err("rename into", &e.error))?;
        Ok(())
    }
}

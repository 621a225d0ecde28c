//! General application configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// `tracing` filter directive (e.g. `ado_auth=debug`). Overridden by
    /// `ADO_LOG` and by `--quiet` / `--verbose`.
    #[serde(default)]
    pub log_filter: String,
}

impl GeneralConfig {
    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        Some(self.log_filter.as_str()).filter(|f| !f.is_empty())
    }
}

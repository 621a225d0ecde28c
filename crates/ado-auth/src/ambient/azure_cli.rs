use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Deserialize;

use super::TokenCredential;
use super::process::{run_tool, tool_program};
use crate::error::AuthError;
use crate::oauth::AccessToken;

const NAME: &str = "AzureCliCredential";

/// Token from the signed-in Azure CLI (`az login`).
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
    program: String,
}

impl AzureCliCredential {
    /// `tenant_id` scopes the request to one directory for multi-tenant users.
    #[must_use]
    pub fn new(tenant_id: Option<String>) -> Self {
        Self {
            tenant_id,
            program: tool_program("az"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    /// Epoch seconds; present on Azure CLI 2.54+.
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
    /// Local wall-clock time, e.g. `2024-01-01 12:00:00.000000`.
    #[serde(default)]
    expires_on: Option<String>,
}

fn parse_output(stdout: &[u8]) -> Result<AccessToken, String> {
    let output: CliTokenOutput =
        serde_json::from_slice(stdout).map_err(|e| format!("unexpected az output: {e}"))?;

    // A token with unknown expiry is used once and never cached.
    let expires_at = output
        .expires_on_epoch
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .or_else(|| output.expires_on.as_deref().and_then(parse_local_time))
        .unwrap_or_else(Utc::now);

    Ok(AccessToken {
        token: output.access_token,
        expires_at,
    })
}

fn parse_local_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()?
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let resource = scope.strip_suffix("/.default").unwrap_or(scope);
        let mut args = vec![
            "account",
            "get-access-token",
            "--output",
            "json",
            "--resource",
            resource,
        ];
        if let Some(tenant) = self.tenant_id.as_deref() {
            args.extend(["--tenant", tenant]);
        }

        let stdout = run_tool(NAME, &self.program, &args).await?;
        parse_output(&stdout).map_err(|message| AuthError::SourceUnavailable {
            source_name: NAME,
            message,
        })
    }
}

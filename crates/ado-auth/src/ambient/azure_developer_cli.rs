use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::TokenCredential;
use super::process::{run_tool, tool_program};
use crate::error::AuthError;
use crate::oauth::AccessToken;

const NAME: &str = "AzureDeveloperCliCredential";

/// Token from the signed-in Azure Developer CLI (`azd auth login`).
#[derive(Debug, Clone)]
pub struct AzureDeveloperCliCredential {
    tenant_id: Option<String>,
    program: String,
}

impl AzureDeveloperCliCredential {
    #[must_use]
    pub fn new(tenant_id: Option<String>) -> Self {
        Self {
            tenant_id,
            program: tool_program("azd"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdTokenOutput {
    token: String,
    /// RFC 3339.
    expires_on: String,
}

fn parse_output(stdout: &[u8]) -> Result<AccessToken, String> {
    let output: AzdTokenOutput =
        serde_json::from_slice(stdout).map_err(|e| format!("unexpected azd output: {e}"))?;
    let expires_at = DateTime::parse_from_rfc3339(&output.expires_on)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid expiresOn '{}': {e}", output.expires_on))?;
    Ok(AccessToken {
        token: output.token,
        expires_at,
    })
}

#[async_trait]
impl TokenCredential for AzureDeveloperCliCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let mut args = vec!["auth", "token", "--output", "json", "--scope", scope];
        if let Some(tenant) = self.tenant_id.as_deref() {
            args.extend(["--tenant-id", tenant]);
        }

        let stdout = run_tool(NAME, &self.program, &args).await?;
        parse_output(&stdout).map_err(|message| AuthError::SourceUnavailable {
            source_name: NAME,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_and_expiry() {
        let token = parse_output(br#"{"token":"azd-token","expiresOn":"2030-01-01T00:00:00Z"}"#)
            .expect("parse");
        assert_eq!(token.token, "azd-token");
        assert_eq!(token.expires_at.timestamp(), 1_893_456_000);
    }

    #[test]
    fn rejects_bad_expiry() {
        let err = parse_output(br#"{"token":"t","expiresOn":"tomorrow"}"#)
            .err()
            .expect("should fail");
        assert!(err.contains("invalid expiresOn"));
    }
}

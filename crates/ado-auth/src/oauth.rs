//! Shared OAuth2 token-endpoint plumbing.
//!
//! Both the client-secret source of the ambient chain and the interactive
//! public client post `application/x-www-form-urlencoded` grants to an Entra
//! ID token endpoint and read the same JSON response shape.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::AuthError;

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_BUFFER: TimeDelta = TimeDelta::minutes(5);

/// Lifetime assumed when a token response omits `expires_in`.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// A bearer token plus its expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Usable for at least [`EXPIRY_BUFFER`] more.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now() + EXPIRY_BUFFER
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    /// Empty when the endpoint omits it; callers treat that as no token.
    #[serde(default)]
    pub access_token: String,
    /// Seconds; Entra sends a number, IMDS sends a string.
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl TokenResponse {
    pub fn lifetime_secs(&self) -> i64 {
        match &self.expires_in {
            Some(serde_json::Value::Number(n)) => n.as_i64(),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        }
        .unwrap_or(DEFAULT_LIFETIME_SECS)
    }

    /// Out-of-range lifetimes fall back to [`DEFAULT_LIFETIME_SECS`].
    pub fn to_access_token(&self) -> AccessToken {
        let now = Utc::now();
        let expires_at = TimeDelta::try_seconds(self.lifetime_secs())
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or_else(|| now + TimeDelta::seconds(DEFAULT_LIFETIME_SECS));
        AccessToken {
            token: self.access_token.clone(),
            expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

pub(crate) fn form_encode(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// POST a form-encoded grant and parse the token response.
///
/// # Errors
///
/// [`AuthError::Http`] on transport failure, [`AuthError::TokenEndpoint`]
/// when the endpoint answers with a non-success status or an unreadable body.
pub(crate) async fn request_token(
    client: &reqwest::Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let resp = client
        .post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form_encode(params))
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => AuthError::TokenEndpoint {
                error: err.error,
                description: err.error_description,
            },
            Err(_) => AuthError::TokenEndpoint {
                error: format!("HTTP {status}"),
                description: body,
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| AuthError::TokenEndpoint {
        error: "invalid_response".into(),
        description: format!("failed to parse token response: {e}"),
    })
}

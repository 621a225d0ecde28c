use base64::Engine as _;
use serde::Deserialize;

use crate::error::AuthError;

/// The identity fields of an Entra ID token we care about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

impl IdTokenClaims {
    /// `oid.tid`, the same shape MSAL uses for home account ids.
    #[must_use]
    pub fn home_account_id(&self) -> Option<String> {
        let object = self.oid.as_deref().or(self.sub.as_deref())?;
        Some(match self.tid.as_deref() {
            Some(tid) => format!("{object}.{tid}"),
            None => object.to_string(),
        })
    }
}

/// Decode the payload of an ID token without verifying its signature.
///
/// The token comes straight from the token endpoint over TLS and is only
/// used to label the cached account, never to make trust decisions.
///
/// # Errors
///
/// Returns `AuthError::Other` if the JWT format is invalid or the payload
/// is not JSON.
pub fn decode_claims(jwt: &str) -> Result<IdTokenClaims, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Other("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::Other(format!("base64 decode failed: {e}")))?;
    serde_json::from_slice(&payload).map_err(|e| AuthError::Other(format!("JSON parse failed: {e}")))
}

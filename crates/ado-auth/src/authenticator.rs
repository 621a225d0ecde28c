//! The backend-independent credential contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Which credential backend produced an [`Authenticator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Long-lived personal access token from the environment.
    Pat,
    /// Token from the ambient credential chain (CLI session, managed identity, ...).
    Ambient,
    /// Token from the interactive browser flow.
    Interactive,
}

/// Shape of the `Authorization` header an [`AuthKind`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
}

impl AuthKind {
    #[must_use]
    pub const fn scheme(self) -> AuthScheme {
        match self {
            Self::Pat => AuthScheme::Basic,
            Self::Ambient | Self::Interactive => AuthScheme::Bearer,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pat => "pat",
            Self::Ambient => "ambient",
            Self::Interactive => "interactive",
        }
    }
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces credentials for Azure DevOps REST calls.
///
/// One instance is built per process configuration and shared by every
/// caller. Implementations may cache internally; callers make no assumption
/// about how often `get_token` hits the network.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn kind(&self) -> AuthKind;

    /// Raw credential: the PAT itself, or a bearer access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the backend cannot produce a token.
    async fn get_token(&self) -> Result<String, AuthError>;

    /// Complete `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Propagates the [`get_token`](Self::get_token) error.
    async fn authorization_header(&self) -> Result<String, AuthError> {
        let token = self.get_token().await?;
        Ok(bearer_header(&token))
    }
}

#[must_use]
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pat_uses_basic_scheme() {
        assert_eq!(AuthKind::Pat.scheme(), AuthScheme::Basic);
        assert_eq!(AuthKind::Ambient.scheme(), AuthScheme::Bearer);
        assert_eq!(AuthKind::Interactive.scheme(), AuthScheme::Bearer);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&AuthKind::Interactive).expect("serialize");
        assert_eq!(json, "\"interactive\"");
        assert_eq!(AuthKind::Pat.to_string(), "pat");
    }

    #[test]
    fn bearer_header_format() {
        assert_eq!(bearer_header("abc.def"), "Bearer abc.def");
    }
}

use async_trait::async_trait;
use base64::Engine as _;

use crate::authenticator::{AuthKind, Authenticator};
use crate::error::AuthError;

/// Environment variable holding the personal access token.
pub const PAT_ENV_VARIABLE: &str = "AZURE_DEVOPS_PAT";

/// Static personal-access-token backend.
///
/// The `Basic` header is computed once at construction; the token never
/// changes for the lifetime of the process.
pub struct PatAuthenticator {
    token: String,
    basic_header: String,
}

impl PatAuthenticator {
    /// Read the token from [`PAT_ENV_VARIABLE`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingEnvVar`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self, AuthError> {
        let token = std::env::var(PAT_ENV_VARIABLE)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingEnvVar {
                name: PAT_ENV_VARIABLE,
            })?;
        Ok(Self::new(token))
    }

    #[must_use]
    pub fn new(token: String) -> Self {
        let basic_header = basic_header(&token);
        Self {
            token,
            basic_header,
        }
    }
}

impl std::fmt::Debug for PatAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatAuthenticator")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Authenticator for PatAuthenticator {
    fn kind(&self) -> AuthKind {
        AuthKind::Pat
    }

    async fn get_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }

    async fn authorization_header(&self) -> Result<String, AuthError> {
        Ok(self.basic_header.clone())
    }
}

/// `Basic base64(":" + token)`: empty user name, token as password.
fn basic_header(token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
    format!("Basic {encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_uses_empty_user_name() {
        // ":example-pat"
        assert_eq!(basic_header("example-pat"), "Basic OmV4YW1wbGUtcGF0");
    }

    #[tokio::test]
    async fn token_and_header_are_stable() {
        let auth = PatAuthenticator::new("secret".into());
        assert_eq!(auth.kind(), AuthKind::Pat);
        assert_eq!(auth.get_token().await.expect("token"), "secret");
        let first = auth.authorization_header().await.expect("header");
        let second = auth.authorization_header().await.expect("header");
        assert_eq!(first, second);
        assert!(first.starts_with("Basic "));
    }

    #[test]
    fn debug_redacts_token() {
        let auth = PatAuthenticator::new("very-secret".into());
        assert!(!format!("{auth:?}").contains("very-secret"));
    }

    #[test]
    fn from_env_rejects_missing_and_empty() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let err = PatAuthenticator::from_env().expect_err("unset should fail");
            assert!(err.to_string().contains(PAT_ENV_VARIABLE));

            jail.set_env(PAT_ENV_VARIABLE, "");
            assert!(PatAuthenticator::from_env().is_err());
            Ok(())
        });
    }
}

//! Interactive OAuth backend.
//!
//! The first `get_token` opens the system browser for an authorization-code
//! sign-in. The resulting account handle is kept for the life of the
//! authenticator and used for silent reacquisition; when that fails for any
//! reason the browser flow runs again.

mod browser_flow;
mod client;
mod id_token;
mod pkce;

pub use client::{BrowserLauncher, EntraPublicClient, PublicClientConfig};
pub use id_token::{IdTokenClaims, decode_claims};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::authenticator::{AuthKind, Authenticator};
use crate::error::AuthError;

/// Handle to a signed-in account, used for silent reacquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub home_account_id: String,
    pub username: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// May be empty if the identity provider returned no token.
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// OAuth public client able to acquire tokens silently or interactively.
#[async_trait]
pub trait PublicClient: Send + Sync {
    /// # Errors
    ///
    /// Any error means the caller should fall back to interactive sign-in.
    async fn acquire_token_silent(&self, account: &Account) -> Result<AuthenticationResult, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError`] if the browser flow or the code exchange fails.
    async fn acquire_token_interactive(&self) -> Result<AuthenticationResult, AuthError>;
}

/// Interactive backend: silent first, browser second.
pub struct InteractiveAuthenticator<C = EntraPublicClient> {
    client: C,
    session: Mutex<Option<Account>>,
}

impl<C: PublicClient> InteractiveAuthenticator<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            session: Mutex::new(None),
        }
    }

    /// The account remembered from the last interactive sign-in.
    pub async fn account(&self) -> Option<Account> {
        self.session.lock().await.clone()
    }

    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: PublicClient> Authenticator for InteractiveAuthenticator<C> {
    fn kind(&self) -> AuthKind {
        AuthKind::Interactive
    }

    async fn get_token(&self) -> Result<String, AuthError> {
        // Held for the whole call so concurrent callers never open two browser windows.
        let mut session = self.session.lock().await;

        if let Some(account) = session.as_ref() {
            match self.client.acquire_token_silent(account).await {
                Ok(result) if !result.access_token.is_empty() => return Ok(result.access_token),
                Ok(_) => tracing::debug!("silent acquisition returned no access token"),
                Err(error) => tracing::debug!(%error, "silent acquisition failed; falling back to browser"),
            }
        }

        let result = self.client.acquire_token_interactive().await?;
        *session = Some(result.account);

        if result.access_token.is_empty() {
            return Err(AuthError::NoAccessToken);
        }
        Ok(result.access_token)
    }
}

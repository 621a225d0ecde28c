use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::browser_flow::{LoopbackListener, open_browser};
use super::id_token::decode_claims;
use super::pkce::{PkcePair, generate_state};
use super::{Account, AuthenticationResult, PublicClient};
use crate::error::AuthError;
use crate::oauth::{AccessToken, TokenResponse, request_token};

/// Scopes every request carries besides the resource scope.
const OIDC_SCOPES: &str = "openid profile offline_access";

/// Opens the authorization URL. Defaults to the system browser.
pub type BrowserLauncher = Arc<dyn Fn(&str) + Send + Sync>;

/// Public-client registration and authority.
#[derive(Debug, Clone)]
pub struct PublicClientConfig {
    pub client_id: String,
    /// `https://login.microsoftonline.com/{tenant|common}`.
    pub authority: String,
    /// Resource scope, e.g. `<app id>/.default`.
    pub scope: String,
    pub login_timeout: Duration,
}

struct CachedTokens {
    access: AccessToken,
    refresh_token: Option<String>,
}

/// Entra ID public client: authorization code + PKCE over a loopback
/// redirect, with an in-memory token cache per account.
pub struct EntraPublicClient {
    config: PublicClientConfig,
    http: reqwest::Client,
    launcher: BrowserLauncher,
    tokens: Mutex<HashMap<String, CachedTokens>>,
}

impl EntraPublicClient {
    #[must_use]
    pub fn new(config: PublicClientConfig) -> Self {
        Self {
            config: PublicClientConfig {
                authority: config.authority.trim_end_matches('/').to_string(),
                ..config
            },
            http: reqwest::Client::new(),
            launcher: Arc::new(open_browser),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the browser launcher (headless environments, tests).
    #[must_use]
    pub fn with_launcher(mut self, launcher: BrowserLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    #[must_use]
    pub fn authority(&self) -> &str {
        &self.config.authority
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.config.authority)
    }

    fn scopes(&self) -> String {
        format!("{} {OIDC_SCOPES}", self.config.scope)
    }

    fn authorize_url(&self, redirect_uri: &str, state: &str, challenge: &str) -> String {
        format!(
            "{}/oauth2/v2.0/authorize?client_id={}&response_type=code&response_mode=query\
             &redirect_uri={}&scope={}&state={state}&code_challenge={challenge}\
             &code_challenge_method=S256&prompt=select_account",
            self.config.authority,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.scopes()),
        )
    }

    async fn remember(&self, response: &TokenResponse, account: &Account) {
        let mut tokens = self.tokens.lock().await;
        let previous_refresh = tokens
            .get(&account.home_account_id)
            .and_then(|t| t.refresh_token.clone());
        tokens.insert(
            account.home_account_id.clone(),
            CachedTokens {
                access: response.to_access_token(),
                refresh_token: response.refresh_token.clone().or(previous_refresh),
            },
        );
    }
}

fn account_from(response: &TokenResponse) -> Account {
    let claims = response
        .id_token
        .as_deref()
        .map(decode_claims)
        .transpose()
        .unwrap_or_else(|error| {
            tracing::debug!(%error, "unreadable id token; caching tokens under a placeholder account");
            None
        })
        .unwrap_or_default();

    Account {
        home_account_id: claims
            .home_account_id()
            .unwrap_or_else(|| "anonymous".to_string()),
        username: claims.preferred_username,
        tenant_id: claims.tid,
    }
}

#[async_trait]
impl PublicClient for EntraPublicClient {
    async fn acquire_token_silent(&self, account: &Account) -> Result<AuthenticationResult, AuthError> {
        let refresh_token = {
            let tokens = self.tokens.lock().await;
            let cached = tokens
                .get(&account.home_account_id)
                .ok_or_else(|| AuthError::NoCachedTokens(account.home_account_id.clone()))?;
            if cached.access.is_fresh() {
                return Ok(AuthenticationResult {
                    access_token: cached.access.token.clone(),
                    expires_at: cached.access.expires_at,
                    account: account.clone(),
                });
            }
            cached
                .refresh_token
                .clone()
                .ok_or_else(|| AuthError::NoCachedTokens(account.home_account_id.clone()))?
        };

        let scopes = self.scopes();
        let response = request_token(
            &self.http,
            &self.token_url(),
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.config.client_id),
                ("refresh_token", &refresh_token),
                ("scope", &scopes),
            ],
        )
        .await?;

        self.remember(&response, account).await;
        let access = response.to_access_token();
        Ok(AuthenticationResult {
            access_token: access.token,
            expires_at: access.expires_at,
            account: account.clone(),
        })
    }

    async fn acquire_token_interactive(&self) -> Result<AuthenticationResult, AuthError> {
        let pkce = PkcePair::generate()?;
        let state = generate_state()?;
        let listener = LoopbackListener::bind()?;
        let redirect_uri = listener.redirect_uri();

        (self.launcher)(&self.authorize_url(&redirect_uri, &state, &pkce.challenge));
        let code = listener
            .wait_for_code(state, self.config.login_timeout)
            .await?;

        let scopes = self.scopes();
        let response = request_token(
            &self.http,
            &self.token_url(),
            &[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("code", &code),
                ("redirect_uri", &redirect_uri),
                ("code_verifier", &pkce.verifier),
                ("scope", &scopes),
            ],
        )
        .await?;

        let account = account_from(&response);
        tracing::info!(
            account = account.username.as_deref().unwrap_or("<unknown>"),
            tenant = account.tenant_id.as_deref().unwrap_or("<unknown>"),
            "interactive sign-in completed"
        );
        self.remember(&response, &account).await;

        let access = response.to_access_token();
        Ok(AuthenticationResult {
            access_token: access.token,
            expires_at: access.expires_at,
            account,
        })
    }
}

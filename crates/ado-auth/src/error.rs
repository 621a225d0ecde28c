use thiserror::Error;

/// Message returned when no ambient credential source yields a token.
pub const CHAIN_EXHAUSTED_MESSAGE: &str = "Failed to obtain Azure DevOps token. Ensure you have Azure CLI logged or use interactive type of authentication.";

/// Message returned when the interactive flow finishes without an access token.
pub const NO_ACCESS_TOKEN_MESSAGE: &str = "Failed to obtain Azure DevOps OAuth token.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "Personal Access Token authentication requires the {name} environment variable to be set."
    )]
    MissingEnvVar { name: &'static str },

    #[error(
        "Failed to obtain Azure DevOps token. Ensure you have Azure CLI logged or use interactive type of authentication. ({details})"
    )]
    CredentialUnavailable { details: String },

    /// A single chain source could not produce a token. Only surfaced through
    /// [`AuthError::CredentialUnavailable`] once the whole chain is exhausted.
    #[error("{source_name}: {message}")]
    SourceUnavailable {
        source_name: &'static str,
        message: String,
    },

    #[error("browser login failed: {0}")]
    OAuthFlowFailed(String),

    #[error("token endpoint rejected the request: {error}: {description}")]
    TokenEndpoint { error: String, description: String },

    #[error("no cached tokens for account {0}")]
    NoCachedTokens(String),

    #[error("Failed to obtain Azure DevOps OAuth token.")]
    NoAccessToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

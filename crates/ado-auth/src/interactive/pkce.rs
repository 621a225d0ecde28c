//! PKCE (RFC 7636) `S256` pair and the CSRF `state` nonce.

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// # Errors
    ///
    /// Returns `AuthError::OAuthFlowFailed` if the OS random source fails.
    pub fn generate() -> Result<Self, AuthError> {
        let verifier = random_urlsafe(32)?;
        let challenge = challenge_for(&verifier);
        Ok(Self {
            verifier,
            challenge,
        })
    }
}

fn challenge_for(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// 16 random bytes as hex.
///
/// # Errors
///
/// Returns `AuthError::OAuthFlowFailed` if the OS random source fails.
pub fn generate_state() -> Result<String, AuthError> {
    let mut nonce_bytes = [0u8; 16];
    getrandom::fill(&mut nonce_bytes)
        .map_err(|e| AuthError::OAuthFlowFailed(format!("failed to generate CSRF nonce: {e}")))?;
    Ok(nonce_bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn random_urlsafe(len: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; len];
    getrandom::fill(&mut bytes)
        .map_err(|e| AuthError::OAuthFlowFailed(format!("failed to generate PKCE verifier: {e}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

use std::time::Duration;

use async_trait::async_trait;

use super::TokenCredential;
use crate::error::AuthError;
use crate::oauth::{AccessToken, TokenResponse};

const NAME: &str = "ManagedIdentityCredential";

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// IMDS is link-local; off Azure the request must fail fast.
const IMDS_TIMEOUT: Duration = Duration::from_secs(2);

/// Token from the Azure Instance Metadata Service.
pub struct ManagedIdentityCredential {
    endpoint: String,
    client_id: Option<String>,
    http: reqwest::Client,
}

impl Default for ManagedIdentityCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedIdentityCredential {
    /// System-assigned identity, or the user-assigned one named by `AZURE_CLIENT_ID`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(
            IMDS_ENDPOINT,
            std::env::var("AZURE_CLIENT_ID").ok().filter(|v| !v.is_empty()),
        )
    }

    #[must_use]
    pub fn with_endpoint(endpoint: &str, client_id: Option<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client_id,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let resource = scope.strip_suffix("/.default").unwrap_or(scope);
        let mut url = format!(
            "{}?api-version={IMDS_API_VERSION}&resource={}",
            self.endpoint,
            urlencoding::encode(resource)
        );
        if let Some(client_id) = &self.client_id {
            url.push_str(&format!("&client_id={}", urlencoding::encode(client_id)));
        }

        let unavailable = |message: String| AuthError::SourceUnavailable {
            source_name: NAME,
            message,
        };

        let resp = self
            .http
            .get(&url)
            .header("Metadata", "true")
            .timeout(IMDS_TIMEOUT)
            .send()
            .await
            .map_err(|e| unavailable(format!("IMDS unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(unavailable(format!("IMDS returned HTTP {status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid IMDS response: {e}")))?;
        Ok(token.to_access_token())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn reads_imds_token_with_string_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .and(header("Metadata", "true"))
            .and(query_param("resource", "499b84ac-1321-427f-aa17-267ca6975798"))
            .and(query_param("client_id", "user-assigned"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"mi-token","expires_in":"3599","token_type":"Bearer"}"#,
            ))
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::with_endpoint(
            &format!("{}/metadata/identity/oauth2/token", server.uri()),
            Some("user-assigned".into()),
        );
        let token = credential
            .get_token("499b84ac-1321-427f-aa17-267ca6975798/.default")
            .await
            .expect("token");
        assert_eq!(token.token, "mi-token");
        assert!(token.is_fresh());
    }

    #[tokio::test]
    async fn missing_identity_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Identity not found"))
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::with_endpoint(&server.uri(), None);
        let err = credential.get_token("api/.default").await.expect_err("should fail");
        assert!(matches!(err, AuthError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("Identity not found"));
    }
}

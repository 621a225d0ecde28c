use async_trait::async_trait;
use reqwest::StatusCode;

use super::TenantError;

/// Base of the per-organization identity endpoint.
pub const DEFAULT_PROBE_BASE_URL: &str = "https://vssps.dev.azure.com";

/// Response header that carries the owning tenant.
pub const TENANT_HEADER: &str = "x-vss-resourcetenant";

/// Discovers the tenant that owns an organization.
#[async_trait]
pub trait TenantProbe: Send + Sync {
    /// # Errors
    ///
    /// Returns [`TenantError`] when the tenant cannot be determined.
    async fn fetch_tenant(&self, org_name: &str) -> Result<String, TenantError>;
}

/// `HEAD {base}/{org}`.
///
/// The endpoint answers HEAD with 404 and still attaches the tenant header;
/// 404 is therefore the only accepted status.
#[derive(Debug, Clone)]
pub struct HttpTenantProbe {
    base_url: String,
    http: reqwest::Client,
}

impl Default for HttpTenantProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_BASE_URL)
    }
}

impl HttpTenantProbe {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TenantProbe for HttpTenantProbe {
    async fn fetch_tenant(&self, org_name: &str) -> Result<String, TenantError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(org_name));
        let resp = self.http.head(&url).send().await?;

        if resp.status() != StatusCode::NOT_FOUND {
            return Err(TenantError::UnexpectedStatus(resp.status().as_u16()));
        }

        resp.headers()
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(TenantError::MissingTenantHeader)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn probe_with(status: u16, tenant: Option<&str>) -> Result<String, TenantError> {
        let server = MockServer::start().await;
        let mut template = ResponseTemplate::new(status);
        if let Some(tenant) = tenant {
            template = template.insert_header(TENANT_HEADER, tenant);
        }
        Mock::given(method("HEAD"))
            .and(path("/contoso"))
            .respond_with(template)
            .mount(&server)
            .await;

        HttpTenantProbe::new(&server.uri()).fetch_tenant("contoso").await
    }

    #[tokio::test]
    async fn not_found_with_header_is_success() {
        let tenant = probe_with(404, Some("T1")).await.expect("tenant");
        assert_eq!(tenant, "T1");
    }

    #[tokio::test]
    async fn ok_status_is_unexpected() {
        let err = probe_with(200, Some("T1")).await.expect_err("should fail");
        assert!(matches!(err, TenantError::UnexpectedStatus(200)));
        assert!(err.to_string().contains("Expected status 404, got 200"));
    }

    #[tokio::test]
    async fn missing_header_fails() {
        let err = probe_with(404, None).await.expect_err("should fail");
        assert!(matches!(err, TenantError::MissingTenantHeader));
    }

    #[tokio::test]
    async fn blank_header_fails() {
        let err = probe_with(404, Some("  ")).await.expect_err("should fail");
        assert!(matches!(err, TenantError::MissingTenantHeader));
    }

    #[tokio::test]
    async fn transport_error_is_http() {
        // nothing listens on port 9 locally
        let err = HttpTenantProbe::new("http://127.0.0.1:9")
            .fetch_tenant("contoso")
            .await
            .expect_err("should fail");
        assert!(matches!(err, TenantError::Http(_)));
    }
}

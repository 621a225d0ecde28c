use std::time::{Duration, Instant};

use crate::error::AuthError;

/// Loopback listener that receives the authorization-code redirect.
///
/// Binds `127.0.0.1` on an ephemeral port; the redirect URI handed to the
/// identity provider is `http://localhost:{port}`.
pub struct LoopbackListener {
    server: tiny_http::Server,
    port: u16,
}

impl LoopbackListener {
    /// # Errors
    ///
    /// Returns `AuthError::OAuthFlowFailed` if no local port can be bound.
    pub fn bind() -> Result<Self, AuthError> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|e| AuthError::OAuthFlowFailed(format!("failed to bind: {e}")))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .ok_or_else(|| AuthError::OAuthFlowFailed("no port".into()))?;
        Ok(Self { server, port })
    }

    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Wait for the redirect carrying `code` and a matching `state`.
    ///
    /// `tiny_http::recv` blocks, so the wait runs in `spawn_blocking`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OAuthFlowFailed` on timeout, state mismatch, or an
    /// `error` parameter from the identity provider.
    pub async fn wait_for_code(
        self,
        expected_state: String,
        timeout: Duration,
    ) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || wait_for_callback(&self.server, timeout, &expected_state))
            .await
            .map_err(|e| AuthError::OAuthFlowFailed(format!("spawn_blocking join: {e}")))?
    }
}

/// Launch the system browser, printing the URL when that is not possible.
pub fn open_browser(url: &str) {
    eprintln!("Opening browser to sign in to Azure DevOps: {url}");
    if let Err(error) = open::that(url) {
        tracing::warn!(%error, "failed to open browser");
        eprintln!("Open the URL above manually, then return here.");
    }
}

#[derive(Debug, Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn parse_query(query: &str) -> Result<CallbackParams, AuthError> {
    let mut params = CallbackParams::default();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        // form encoding uses '+' for spaces in error descriptions
        let value = urlencoding::decode(&value.replace('+', " "))
            .map_err(|e| AuthError::OAuthFlowFailed(format!("URL decode: {e}")))?
            .into_owned();
        match key {
            "code" => params.code = Some(value),
            "state" => params.state = Some(value),
            "error" => params.error = Some(value),
            "error_description" => params.error_description = Some(value),
            _ => {}
        }
    }
    Ok(params)
}

fn html_response(status: u16, title: &str, message: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = format!("<html><body><h1>{title}</h1><p>{message}</p></body></html>");
    let response = tiny_http::Response::from_string(body).with_status_code(status);
    match tiny_http::Header::from_bytes("Content-Type", "text/html; charset=utf-8") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

/// Block until the listener receives the redirect.
///
/// Requests without a query string (favicon, preflight) and redirects that
/// carry neither `code` nor `error` are answered and ignored.
fn wait_for_callback(
    server: &tiny_http::Server,
    timeout: Duration,
    expected_state: &str,
) -> Result<String, AuthError> {
    let deadline = Instant::now() + timeout;
    let timed_out = || {
        AuthError::OAuthFlowFailed(format!(
            "browser callback timed out after {}s",
            timeout.as_secs()
        ))
    };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(req)) => req,
            Ok(None) => return Err(timed_out()),
            Err(e) => return Err(AuthError::OAuthFlowFailed(format!("recv error: {e}"))),
        };

        let url = request.url().to_string();
        let Some((_, query)) = url.split_once('?') else {
            let _ = request.respond(tiny_http::Response::empty(204));
            continue;
        };

        let params = parse_query(query)?;

        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or_default();
            let _ = request.respond(html_response(
                400,
                "Sign-in failed",
                "The identity provider returned an error. Check the terminal output.",
            ));
            return Err(AuthError::OAuthFlowFailed(format!("{error}: {description}")));
        }

        let Some(code) = params.code else {
            let _ = request.respond(html_response(
                200,
                "Waiting for authentication…",
                "Redirecting, please wait.",
            ));
            continue;
        };

        if params.state.as_deref() != Some(expected_state) {
            let _ = request.respond(html_response(
                400,
                "Sign-in failed",
                "State mismatch. Check the terminal output.",
            ));
            return Err(AuthError::OAuthFlowFailed(
                "state mismatch, possible CSRF".into(),
            ));
        }

        let _ = request.respond(html_response(
            200,
            "Authenticated",
            "You can close this tab and return to the terminal.",
        ));
        return Ok(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hit(port: u16, path_and_query: &str) {
        let _ = reqwest::get(format!("http://127.0.0.1:{port}{path_and_query}")).await;
    }

    fn port_of(listener: &LoopbackListener) -> u16 {
        listener
            .redirect_uri()
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .expect("port")
    }

    #[test]
    fn parse_query_decodes_values() {
        let params =
            parse_query("code=a%2Fb&state=s1&error_description=User+cancelled%21").expect("parse");
        assert_eq!(params.code.as_deref(), Some("a/b"));
        assert_eq!(params.state.as_deref(), Some("s1"));
        assert_eq!(params.error_description.as_deref(), Some("User cancelled!"));
        assert!(params.error.is_none());
    }

    #[test]
    fn redirect_uri_uses_localhost() {
        let listener = LoopbackListener::bind().expect("bind");
        assert!(listener.redirect_uri().starts_with("http://localhost:"));
    }

    #[tokio::test]
    async fn returns_code_after_ignoring_noise() {
        let listener = LoopbackListener::bind().expect("bind");
        let port = port_of(&listener);
        let wait = tokio::spawn(listener.wait_for_code("st".into(), Duration::from_secs(10)));

        hit(port, "/favicon.ico").await;
        hit(port, "/?session_state=abc").await;
        hit(port, "/?code=auth-code&state=st").await;

        let code = wait.await.expect("join").expect("code");
        assert_eq!(code, "auth-code");
    }

    #[tokio::test]
    async fn rejects_state_mismatch() {
        let listener = LoopbackListener::bind().expect("bind");
        let port = port_of(&listener);
        let wait = tokio::spawn(listener.wait_for_code("expected".into(), Duration::from_secs(10)));

        hit(port, "/?code=auth-code&state=forged").await;

        let err = wait.await.expect("join").expect_err("should fail");
        assert!(err.to_string().contains("state mismatch"));
    }

    #[tokio::test]
    async fn surfaces_provider_error() {
        let listener = LoopbackListener::bind().expect("bind");
        let port = port_of(&listener);
        let wait = tokio::spawn(listener.wait_for_code("st".into(), Duration::from_secs(10)));

        hit(port, "/?error=access_denied&error_description=User+declined&state=st").await;

        let err = wait.await.expect("join").expect_err("should fail");
        assert!(err.to_string().contains("access_denied: User declined"));
    }

    #[tokio::test]
    async fn times_out_without_callback() {
        let listener = LoopbackListener::bind().expect("bind");
        let err = listener
            .wait_for_code("st".into(), Duration::from_millis(50))
            .await
            .expect_err("should time out");
        assert!(err.to_string().contains("timed out"));
    }
}

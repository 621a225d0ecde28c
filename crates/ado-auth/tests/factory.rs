//! Backend selection through the public factory.

use std::sync::Arc;

use ado_auth::ambient::{AmbientAuthenticator, ChainPreference};
use ado_auth::{
    AuthError, AuthKind, AuthMode, AuthOptions, Authenticator, create_authenticator,
    create_authenticator_with,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an authenticator with a scrubbed environment plus `vars`.
fn build_in_jail(
    mode: AuthMode,
    vars: &[(&str, &str)],
    options: &AuthOptions,
) -> Result<Arc<dyn Authenticator>, AuthError> {
    let mut built = None;
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        for (name, value) in vars {
            jail.set_env(name, value);
        }
        built = Some(create_authenticator_with(mode, None, options));
        Ok(())
    });
    built.expect("jail closure ran")
}

#[test]
fn pat_without_variable_fails_with_guidance() {
    let err = build_in_jail(AuthMode::Pat, &[], &AuthOptions::default())
        .err()
        .expect("pat without token must fail");

    assert!(matches!(err, AuthError::MissingEnvVar { .. }));
    assert_eq!(
        err.to_string(),
        "Personal Access Token authentication requires the AZURE_DEVOPS_PAT environment variable to be set."
    );
}

#[test]
fn empty_pat_counts_as_missing() {
    let result = build_in_jail(AuthMode::Pat, &[("AZURE_DEVOPS_PAT", "")], &AuthOptions::default());
    assert!(matches!(result, Err(AuthError::MissingEnvVar { .. })));
}

#[tokio::test]
async fn pat_yields_token_and_basic_header() {
    let auth = build_in_jail(
        AuthMode::Pat,
        &[("AZURE_DEVOPS_PAT", "example-pat")],
        &AuthOptions::default(),
    )
    .expect("pat configured");

    assert_eq!(auth.kind(), AuthKind::Pat);
    assert_eq!(auth.get_token().await.expect("token"), "example-pat");
    assert_eq!(
        auth.authorization_header().await.expect("header"),
        "Basic OmV4YW1wbGUtcGF0"
    );
}

#[test]
fn selector_strings_map_to_backends() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("AZURE_DEVOPS_PAT", "x");
        let cases = [
            ("pat", AuthKind::Pat),
            ("azcli", AuthKind::Ambient),
            ("env", AuthKind::Ambient),
            ("interactive", AuthKind::Interactive),
            ("Interactive", AuthKind::Interactive),
            ("nonsense", AuthKind::Interactive),
        ];
        for (selector, expected) in cases {
            let auth = create_authenticator(selector, Some("tenant-a")).expect("construct");
            assert_eq!(auth.kind(), expected, "selector {selector:?}");
        }
        Ok(())
    });
}

#[test]
fn chain_preference_follows_environment() {
    let names = |value: Option<&str>, tenant: Option<&str>| {
        let mut collected = Vec::new();
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            if let Some(value) = value {
                jail.set_env("AZURE_TOKEN_CREDENTIALS", value);
            }
            let auth = AmbientAuthenticator::new(
                ChainPreference::from_env(),
                tenant,
                &AuthOptions::default(),
            );
            collected = auth.source_names();
            Ok(())
        });
        collected
    };

    assert_eq!(
        names(None, None),
        [
            "EnvironmentCredential",
            "ManagedIdentityCredential",
            "AzureCliCredential",
            "AzureDeveloperCliCredential"
        ]
    );
    assert_eq!(
        names(Some("dev"), None),
        ["AzureCliCredential", "AzureDeveloperCliCredential"]
    );
    assert_eq!(
        names(Some("prod"), None),
        ["EnvironmentCredential", "ManagedIdentityCredential"]
    );
    assert_eq!(names(Some("bogus"), None).len(), 4);
    assert_eq!(
        names(Some("dev"), Some("tenant-a")),
        [
            "AzureCliCredential",
            "AzureCliCredential",
            "AzureDeveloperCliCredential"
        ]
    );
}

#[test]
fn factory_does_not_write_chain_preference() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        create_authenticator("azcli", None).expect("construct");
        assert!(std::env::var("AZURE_TOKEN_CREDENTIALS").is_err());
        Ok(())
    });
}

#[tokio::test]
async fn env_mode_uses_service_principal_from_environment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-sp/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "access_token": "sp-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = AuthOptions {
        authority_host: server.uri(),
        ..AuthOptions::default()
    };
    let auth = build_in_jail(
        AuthMode::Env,
        &[
            ("AZURE_TOKEN_CREDENTIALS", "prod"),
            ("AZURE_TENANT_ID", "tenant-sp"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET", "secret"),
        ],
        &options,
    )
    .expect("ambient never fails construction");

    assert_eq!(auth.get_token().await.expect("token"), "sp-token");
    // second call is served from the in-memory token
    assert_eq!(
        auth.authorization_header().await.expect("header"),
        "Bearer sp-token"
    );
}

//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed cwd and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use ado_config::{AdoConfig, ConfigError};
use pretty_assertions::assert_eq;

#[test]
fn loads_all_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
organization = "contoso"

[auth]
mode = "azcli"
tenant = "72f988bf-86f1-41af-91ab-2d7cd011db47"
client_id = "11111111-2222-3333-4444-555555555555"
authority_host = "https://login.example.com"
login_timeout_secs = 60

[tenant_cache]
path = "/tmp/orgs.cache"
ttl_days = 1
probe_base_url = "http://localhost:8080"

[general]
log_filter = "ado_auth=trace"
"#,
        )?;

        let config: AdoConfig = Figment::from(Serialized::defaults(AdoConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.organization(), Some("contoso"));
        assert_eq!(config.auth.mode, "azcli");
        assert_eq!(
            config.auth.tenant(),
            Some("72f988bf-86f1-41af-91ab-2d7cd011db47")
        );
        assert_eq!(
            config.auth.client_id(),
            Some("11111111-2222-3333-4444-555555555555")
        );
        assert_eq!(config.auth.authority_host(), Some("https://login.example.com"));
        assert_eq!(config.auth.login_timeout_secs, 60);
        assert_eq!(
            config.tenant_cache.path(),
            Some(std::path::PathBuf::from("/tmp/orgs.cache"))
        );
        assert_eq!(config.tenant_cache.ttl_days, 1);
        assert_eq!(
            config.tenant_cache.probe_base_url(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.general.log_filter(), Some("ado_auth=trace"));
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[auth]
mode = "pat"
"#,
        )?;

        let config: AdoConfig = Figment::from(Serialized::defaults(AdoConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.auth.mode, "pat");
        assert_eq!(config.auth.login_timeout_secs, 300);
        assert_eq!(config.tenant_cache.ttl_days, 7);
        assert_eq!(config.organization(), None);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        std::fs::create_dir_all(".ado").expect("mkdir .ado");
        jail.create_file(
            ".ado/config.toml",
            r#"
organization = "fabrikam"

[auth]
mode = "env"
"#,
        )?;

        let config = AdoConfig::load().expect("config loads");
        assert_eq!(config.organization(), Some("fabrikam"));
        assert_eq!(config.auth.mode, "env");
        Ok(())
    });
}

#[test]
fn load_rejects_zero_ttl() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        std::fs::create_dir_all(".ado").expect("mkdir .ado");
        jail.create_file(
            ".ado/config.toml",
            r#"
[tenant_cache]
ttl_days = 0
"#,
        )?;

        let err = AdoConfig::load().expect_err("zero ttl");
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "tenant_cache.ttl_days"));
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        std::fs::create_dir_all(".ado").expect("mkdir .ado");
        jail.create_file(".ado/config.toml", "[auth\nmode = ")?;

        let err = AdoConfig::load().expect_err("bad toml");
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

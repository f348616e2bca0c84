use std::fs;
use std::path::PathBuf;

use dbctl_core::config::{Config, ConfigError, EnvOverrides};
use secrecy::ExposeSecret;
use serial_test::serial;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// 1. Missing config file
// ---------------------------------------------------------------------------

#[test]
fn load_from_nonexistent_path_returns_default_config() {
    let path = PathBuf::from("/tmp/dbctl-test-nonexistent/does/not/exist/config.toml");
    assert!(!path.exists());

    let config = Config::load_from_path(&path).expect("should not error on missing path");

    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

// ---------------------------------------------------------------------------
// 2. Empty config file
// ---------------------------------------------------------------------------

#[test]
fn load_empty_config_file_returns_default_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::load_from_path(&config_path).expect("empty file should parse as default");

    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

// ---------------------------------------------------------------------------
// 3. Corrupt TOML
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_toml_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[[[broken").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    assert!(err.to_string().contains("parse"), "{err}");
}

// ---------------------------------------------------------------------------
// 4. Full profile round trip through a file
// ---------------------------------------------------------------------------

#[test]
fn load_profiles_and_resolve_connection() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
default_profile = "prod"

[profiles.prod]
region = "us-ashburn-1"
auth_token = "prod-token"
timeout_secs = 90

[profiles.local]
endpoint = "http://localhost:9000"
auth_token = "local-token"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.profiles.len(), 2);

    let prod = config
        .resolve_connection(None, &EnvOverrides::default())
        .unwrap();
    assert_eq!(prod.endpoint, "https://database.us-ashburn-1.oraclecloud.com");
    assert_eq!(prod.auth_token.expose_secret(), "prod-token");
    assert_eq!(prod.timeout.as_secs(), 90);

    let local = config
        .resolve_connection(Some("local"), &EnvOverrides::default())
        .unwrap();
    assert_eq!(local.endpoint, "http://localhost:9000");
    assert_eq!(local.auth_token.expose_secret(), "local-token");
}

// ---------------------------------------------------------------------------
// 5. Environment variable expansion inside the file
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn env_vars_expand_in_config_content() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profiles.ci]
endpoint = "${DBCTL_TEST_ENDPOINT:-http://fallback:1}"
auth_token = "${DBCTL_TEST_TOKEN}"
"#,
    )
    .unwrap();

    // SAFETY: serialized with other env-mutating tests
    unsafe {
        std::env::set_var("DBCTL_TEST_TOKEN", "expanded-token");
        std::env::remove_var("DBCTL_TEST_ENDPOINT");
    }

    let config = Config::load_from_path(&config_path).unwrap();
    let ci = &config.profiles["ci"];
    assert_eq!(ci.endpoint.as_deref(), Some("http://fallback:1"));
    assert_eq!(ci.auth_token.as_deref(), Some("expanded-token"));

    unsafe {
        std::env::remove_var("DBCTL_TEST_TOKEN");
    }
}

#[test]
#[serial]
fn unknown_env_vars_are_left_unexpanded() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profiles.other]
auth_token = "${DBCTL_TEST_DEFINITELY_UNSET}"
"#,
    )
    .unwrap();

    unsafe {
        std::env::remove_var("DBCTL_TEST_DEFINITELY_UNSET");
    }

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(
        config.profiles["other"].auth_token.as_deref(),
        Some("${DBCTL_TEST_DEFINITELY_UNSET}")
    );
}

// ---------------------------------------------------------------------------
// 6. Environment overrides
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn env_overrides_read_from_process_environment() {
    unsafe {
        std::env::set_var("DBCTL_ENDPOINT", "http://127.0.0.1:1234");
        std::env::set_var("DBCTL_AUTH_TOKEN", "");
    }

    let env = EnvOverrides::from_env();
    assert_eq!(env.endpoint.as_deref(), Some("http://127.0.0.1:1234"));
    assert!(env.auth_token.is_none(), "empty values are ignored");

    unsafe {
        std::env::remove_var("DBCTL_ENDPOINT");
        std::env::remove_var("DBCTL_AUTH_TOKEN");
    }
}

// ---------------------------------------------------------------------------
// 7. Unreadable path
// ---------------------------------------------------------------------------

#[test]
fn load_directory_as_config_returns_load_error() {
    let dir = TempDir::new().unwrap();

    let err = Config::load_from_path(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError { .. }));
}

//! Unit tests for bootstrap configuration loading
//!
//! Tests cover:
//! - Explicit config file must exist and parse
//! - Missing default config degrades to compiled defaults
//! - First existing candidate location wins
//! - Per-user config location follows the platform config directory
//! - Unreadable files report their path
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate XDG_CONFIG_HOME are marked with #[serial].

use leme_common::config::{
    default_config_candidates, load_bootstrap_config, load_bootstrap_config_from, ConfigOverrides,
    ConfigSource, ServiceSettings, TomlConfig, DEFAULT_PORT,
};
use leme_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Should write config");
    path
}

#[test]
fn test_explicit_config_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        port = 8080
        artifacts_dir = "/opt/leme/artifacts"
        request_timeout_secs = 3
        track_variant_suffixes = ["_Acessivel"]

        [logging]
        level = "debug"
        "#,
    );

    let bootstrap = load_bootstrap_config(Some(&path)).expect("Should load config");
    assert_eq!(bootstrap.source, ConfigSource::Explicit(path.clone()));

    let config = bootstrap.config;
    assert_eq!(config.port, 8080);
    assert_eq!(config.request_timeout_secs, 3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.track_variant_suffixes, vec!["_Acessivel"]);
}

#[test]
fn test_explicit_config_missing_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let err = load_bootstrap_config(Some(&path)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_explicit_config_malformed_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = \"not a number\"");

    let err = load_bootstrap_config(Some(&path)).unwrap_err();
    assert!(matches!(err, Error::Toml(_)));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "host = \"127.0.0.1\"");

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_body_bytes, 64 * 1024);

    let settings = ServiceSettings::resolve(ConfigOverrides::default(), config).unwrap();
    assert_eq!(settings.bind_address(), "127.0.0.1:5000");
    assert_eq!(settings.log_level, "info");
}

#[test]
fn test_config_read_failure_names_path() {
    let dir = TempDir::new().unwrap();

    // A directory cannot be read as a file
    let err = TomlConfig::load(dir.path()).unwrap_err();
    match &err {
        Error::Io { path, .. } => assert_eq!(path, dir.path()),
        other => panic!("Expected Io error, got {}", other),
    }
    assert!(err.to_string().contains(&dir.path().display().to_string()));
}

#[test]
fn test_no_candidate_found_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let candidates = vec![
        dir.path().join("user").join("config.toml"),
        dir.path().join("system").join("config.toml"),
    ];

    let bootstrap =
        load_bootstrap_config_from(None, &candidates).expect("Missing config should not be fatal");
    assert_eq!(bootstrap.source, ConfigSource::Defaults);
    assert_eq!(bootstrap.config.port, DEFAULT_PORT);
    assert_eq!(bootstrap.config.logging.level, "info");
}

#[test]
fn test_first_existing_candidate_wins() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("user.toml");
    let system = dir.path().join("system.toml");
    fs::write(&system, "port = 5001").unwrap();

    let bootstrap = load_bootstrap_config_from(None, &[user.clone(), system.clone()]).unwrap();
    assert_eq!(bootstrap.source, ConfigSource::Discovered(system.clone()));
    assert_eq!(bootstrap.config.port, 5001);

    fs::write(&user, "port = 5002").unwrap();
    let bootstrap = load_bootstrap_config_from(None, &[user.clone(), system]).unwrap();
    assert_eq!(bootstrap.source, ConfigSource::Discovered(user));
    assert_eq!(bootstrap.config.port, 5002);
}

#[test]
fn test_malformed_candidate_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = [");

    let result = load_bootstrap_config_from(None, &[path]);
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_candidate_follows_xdg() {
    let dir = TempDir::new().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let candidates = default_config_candidates();

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(candidates[0], dir.path().join("leme").join("config.toml"));
    assert_eq!(candidates.last(), Some(&PathBuf::from("/etc/leme/config.toml")));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_discovered() {
    let dir = TempDir::new().unwrap();
    let leme_dir = dir.path().join("leme");
    fs::create_dir_all(&leme_dir).unwrap();
    fs::write(leme_dir.join("config.toml"), "port = 5999").unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let result = load_bootstrap_config(None);

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let bootstrap = result.expect("Should load user config");
    assert_eq!(bootstrap.config.port, 5999);
    assert_eq!(
        bootstrap.source,
        ConfigSource::Discovered(leme_dir.join("config.toml"))
    );
}

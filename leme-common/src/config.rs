//! Configuration loading and priority resolution
//!
//! Bootstrap settings come from four sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! Sources 1 and 2 are merged by the binary's argument parser and arrive here
//! as [`ConfigOverrides`]. A missing default config file is not an error; the
//! service starts on compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default artifact directory (relative to the working directory)
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Catalog file name inside the artifact directory
pub const DEFAULT_CATALOG_FILE: &str = "tracks.json";

/// Bootstrap configuration loaded from TOML file
///
/// Cannot change while the service runs; restart to pick up edits.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory containing model, scaler and encoder artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Track catalog JSON (defaults to `<artifacts_dir>/tracks.json`)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Per-request deadline enforced by the HTTP layer
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Variant markers stripped from predicted track keys, tried in order
    #[serde(default = "default_track_variant_suffixes")]
    pub track_variant_suffixes: Vec<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            artifacts_dir: default_artifacts_dir(),
            catalog_path: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
            track_variant_suffixes: default_track_variant_suffixes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_track_variant_suffixes() -> Vec<String> {
    vec!["_Accessible".to_string(), "_Acessivel".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: TomlConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub artifacts_dir: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub artifacts_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    pub track_variant_suffixes: Vec<String>,
    pub log_level: String,
}

impl ServiceSettings {
    /// Merge overrides onto a TOML config and validate the result
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let artifacts_dir = overrides.artifacts_dir.unwrap_or(toml.artifacts_dir);
        let catalog_path = overrides
            .catalog_path
            .or(toml.catalog_path)
            .unwrap_or_else(|| artifacts_dir.join(DEFAULT_CATALOG_FILE));

        let settings = Self {
            host: overrides.host.unwrap_or(toml.host),
            port: overrides.port.unwrap_or(toml.port),
            artifacts_dir,
            catalog_path,
            request_timeout: crate::time::secs_to_duration(toml.request_timeout_secs),
            max_body_bytes: toml.max_body_bytes,
            track_variant_suffixes: toml.track_variant_suffixes,
            log_level: toml.logging.level,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(Error::Config(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.track_variant_suffixes.iter().any(|s| s.is_empty()) {
            return Err(Error::Config(
                "track_variant_suffixes must not contain empty strings".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform config file locations, in lookup order
///
/// `<config_dir>/leme/config.toml` first, then `/etc/leme/config.toml` on Linux.
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("leme").join("config.toml"))
        .into_iter()
        .collect();
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/leme/config.toml"));
    }
    candidates
}

/// Where the bootstrap config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or through `LEME_CONFIG`
    Explicit(PathBuf),
    /// Found at a platform default location
    Discovered(PathBuf),
    /// No file found; compiled defaults
    Defaults,
}

/// Bootstrap config together with its origin
///
/// Loading happens before the tracing subscriber exists, so the origin is
/// logged afterwards through [`BootstrapConfig::log_source`].
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

impl BootstrapConfig {
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
                info!("Loaded config from {}", path.display());
            }
            ConfigSource::Defaults => {
                warn!("No config file found, using built-in defaults");
            }
        }
    }
}

/// Load the bootstrap TOML config from the platform default locations
pub fn load_bootstrap_config(explicit: Option<&Path>) -> Result<BootstrapConfig> {
    load_bootstrap_config_from(explicit, &default_config_candidates())
}

/// Load the bootstrap TOML config
///
/// An explicitly named file must exist and parse. Without one, the first
/// existing path in `candidates` is used; if none exists the compiled
/// defaults apply.
pub fn load_bootstrap_config_from(
    explicit: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<BootstrapConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(BootstrapConfig {
            config: TomlConfig::load(path)?,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }

    match candidates.iter().find(|path| path.exists()) {
        Some(path) => Ok(BootstrapConfig {
            config: TomlConfig::load(path)?,
            source: ConfigSource::Discovered(path.clone()),
        }),
        None => Ok(BootstrapConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        }),
    }
}

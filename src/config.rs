//! Configuration module for dme-nxos
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/dme-nxos/config.toml)
//! - User configuration (~/.dme-nxos.toml)
//! - Project configuration (./dme-nxos.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTPS port for the DME API
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Default HTTP port for the DME API
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device connection settings
    pub device: DeviceConfig,

    /// Validation request settings
    pub validation: ValidationConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Device connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device host name or address
    pub host: Option<String>,

    /// Port (defaults to 443 with SSL, 80 without)
    pub port: Option<u16>,

    /// Use HTTPS
    pub use_ssl: bool,

    /// Verify the device certificate
    pub validate_certs: bool,

    /// Username
    pub username: Option<String>,

    /// Password
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout: u64,

    /// Log every dispatched request with its status code
    pub debug: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            use_ssl: true,
            validate_certs: true,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }
}

impl DeviceConfig {
    /// Get the effective port
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_ssl {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        })
    }

    /// URL scheme matching `use_ssl`
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }
}

/// Validation request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// First JSON-RPC request id of a batch
    pub start_id: u64,

    /// How per-command errors are matched to commands (`position` or `id`)
    pub correlate_by: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            start_id: 1,
            correlate_by: "position".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when `-v` is not given
    pub log_level: String,

    /// Log format (`text` or `json`)
    pub log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

// ============================================================================
// On-disk layers
// ============================================================================

/// One configuration file as written: every key is optional so a later file
/// only overrides what it actually sets.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    device: DeviceLayer,
    validation: ValidationLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceLayer {
    host: Option<String>,
    port: Option<u16>,
    use_ssl: Option<bool>,
    validate_certs: Option<bool>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<u64>,
    debug: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValidationLayer {
    start_id: Option<u64>,
    correlate_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    log_level: Option<String>,
    log_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        paths.push(PathBuf::from("/etc/dme-nxos/config.toml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".dme-nxos.toml"));
        }

        paths.push(PathBuf::from("dme-nxos.toml"));

        if let Ok(env_config) = std::env::var("DME_NXOS_CONFIG") {
            paths.push(PathBuf::from(env_config));
        }

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let layer: ConfigLayer = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(layer))
    }

    /// Merge one file layer into this config; only keys the layer sets win
    fn merge(&self, layer: ConfigLayer) -> Config {
        let mut config = self.clone();

        let device = layer.device;
        let current = &mut config.device;
        if device.host.is_some() {
            current.host = device.host;
        }
        if device.port.is_some() {
            current.port = device.port;
        }
        if device.username.is_some() {
            current.username = device.username;
        }
        if device.password.is_some() {
            current.password = device.password;
        }
        current.use_ssl = device.use_ssl.unwrap_or(current.use_ssl);
        current.validate_certs = device.validate_certs.unwrap_or(current.validate_certs);
        current.timeout = device.timeout.unwrap_or(current.timeout);
        current.debug = device.debug.unwrap_or(current.debug);

        let validation = layer.validation;
        config.validation.start_id = validation.start_id.unwrap_or(config.validation.start_id);
        if let Some(correlate_by) = validation.correlate_by {
            config.validation.correlate_by = correlate_by;
        }

        let logging = layer.logging;
        if let Some(log_level) = logging.log_level {
            config.logging.log_level = log_level;
        }
        if let Some(log_format) = logging.log_format {
            config.logging.log_format = log_format;
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DME_HOST") {
            self.device.host = Some(host);
        }

        if let Ok(port) = std::env::var("DME_PORT") {
            if let Ok(n) = port.parse() {
                self.device.port = Some(n);
            }
        }

        if let Ok(user) = std::env::var("DME_USER") {
            self.device.username = Some(user);
        }

        if let Ok(password) = std::env::var("DME_PASSWORD") {
            self.device.password = Some(password);
        }

        if let Ok(value) = std::env::var("DME_VALIDATE_CERTS") {
            if let Some(b) = parse_env_bool(&value) {
                self.device.validate_certs = b;
            }
        }

        if let Ok(value) = std::env::var("DME_USE_SSL") {
            if let Some(b) = parse_env_bool(&value) {
                self.device.use_ssl = b;
            }
        }

        if let Ok(timeout) = std::env::var("DME_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.device.timeout = n;
            }
        }

        if let Ok(level) = std::env::var("DME_LOG_LEVEL") {
            self.logging.log_level = level;
        }
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

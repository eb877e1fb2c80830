//! Configuration loading and constants.
//!
//! Loads the server configuration from an optional TOML file and defines the
//! constants used for certificate provisioning, listener defaults, logging and
//! shutdown. `AppConfig` is the root configuration struct; command line flags are
//! applied on top of it with [`AppConfig::apply_overrides`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Certificate Provisioning
// =============================================================================

/// Common name used for both subject and issuer of the self-signed certificate
pub const CERT_COMMON_NAME: &str = "localhost";

/// DNS names placed in the subject alternative name extension
pub const CERT_DNS_NAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Certificate lifetime counted from the moment of generation
pub const CERT_VALIDITY_DAYS: i64 = 365;

/// RSA modulus size in bits
pub const RSA_KEY_BITS: usize = 2048;

/// Length of the random serial number (top bit cleared to keep it positive)
pub const SERIAL_NUMBER_BYTES: usize = 20;

// =============================================================================
// Listener and Shutdown
// =============================================================================

/// Default listen address (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTPS port
pub const DEFAULT_PORT: u16 = 8000;

/// Default served directory
pub const DEFAULT_ROOT: &str = ".";

/// Seconds to wait for in-flight connections after an interrupt
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Host name shown in the startup banner
pub const BANNER_HOST: &str = "localhost";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path (optional, ignored when absent)
pub const DEFAULT_CONFIG_PATH: &str = "localtls.toml";

/// Default certificate path
pub const DEFAULT_CERT_PATH: &str = "cert.pem";

/// Default private key path
pub const DEFAULT_KEY_PATH: &str = "key.pem";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "localtls=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Cache-Control value attached to every served response
pub const CACHE_CONTROL_DEV: &str = "no-cache";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTPS listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Certificate and key locations
    #[serde(default)]
    pub tls: TlsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTPS listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Directory whose contents are served
    #[serde(default = "HttpServerConfig::default_root")]
    pub root: PathBuf,
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            root: Self::default_root(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    fn default_root() -> PathBuf {
        PathBuf::from(DEFAULT_ROOT)
    }

    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

/// Certificate and key file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    #[serde(default = "TlsConfig::default_cert_path")]
    pub cert_path: PathBuf,
    #[serde(default = "TlsConfig::default_key_path")]
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: Self::default_cert_path(),
            key_path: Self::default_key_path(),
        }
    }
}

impl TlsConfig {
    fn default_cert_path() -> PathBuf {
        PathBuf::from(DEFAULT_CERT_PATH)
    }

    fn default_key_path() -> PathBuf {
        PathBuf::from(DEFAULT_KEY_PATH)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Values supplied on the command line, each overriding the file value when set.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file that must exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load configuration from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "logging.format must be \"text\" or \"json\", got \"{other}\""
                )))
            }
        }

        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Validation("http.host must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.http.host = host;
        }
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        if let Some(root) = overrides.root {
            self.http.root = root;
        }
        if let Some(cert_path) = overrides.cert_path {
            self.tls.cert_path = cert_path;
        }
        if let Some(key_path) = overrides.key_path {
            self.tls.key_path = key_path;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

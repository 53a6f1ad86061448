use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_EXPIRY_SECONDS, DEFAULT_LOG_LEVEL, DEFAULT_METRICS_PATH, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub token: TokenConfig,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(LoggingConfig::default()),
            metrics: MetricsConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    /// kept as a string so `${PORT:8080}` expansion can feed it
    #[serde(default = "default_server_port")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default = "default_metrics_enabled")]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: default_metrics_enabled(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    /// used when a request carries no `expiry` query parameter
    #[serde(default = "default_expiry_seconds")]
    pub default_expiry_seconds: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_expiry_seconds: default_expiry_seconds(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LEVEL.to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_server_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}

fn default_server_port() -> String {
    DEFAULT_SERVER_PORT.to_string()
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_expiry_seconds() -> u32 {
    DEFAULT_EXPIRY_SECONDS
}

use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{error, info};

use crate::config::proc_validator;
use crate::config::settings::{LoggingConfig, ServiceConfig, SettingsConfig};
use crate::utils::logging::{self, LogLevel};

/// Load settings and install logging from them.
///
/// Nothing can be logged before the subscriber exists, so a settings
/// failure installs default logging first and is logged before it is
/// returned.
pub async fn load_and_init_logging(
    path: Option<&Path>,
    log_level: Option<LogLevel>,
) -> Result<ServiceConfig> {
    match load_or_default(path).await {
        Ok(config) => {
            logging::run(&config.settings, log_level);
            match path {
                Some(path) => info!(path = %path.display(), "settings loaded"),
                None => info!("no config file given, using default settings"),
            }
            Ok(config)
        }
        Err(e) => {
            logging::run(&SettingsConfig::default(), log_level);
            error!("{:#}", e);
            Err(e)
        }
    }
}

/// Load settings from `path`, or fall back to defaults when no path is given.
pub async fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig> {
    match path {
        Some(path) => file_to_config(path)
            .await
            .map_err(|e| anyhow!("Invalid config format: {}", e)),
        None => Ok(ServiceConfig::default()),
    }
}

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

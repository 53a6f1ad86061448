//! Settings validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks server, logging and metrics invariants

use crate::config::settings::{LoggingConfig, MetricsConfig, ServerConfig, ServiceConfig};
use crate::utils::constants::{ROUTE_PING, ROUTE_RTC, ROUTE_RTE, ROUTE_RTM};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const RESERVED_ROUTES: [&str; 4] = [ROUTE_PING, ROUTE_RTC, ROUTE_RTM, ROUTE_RTE];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&cfg.settings.server, &mut errors);
    validate_metrics(&cfg.settings.metrics, &mut errors);
    if let Some(logging) = &cfg.settings.logging {
        validate_logging(logging, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_server(server: &ServerConfig, errors: &mut Vec<String>) {
    if server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            server.port
        ));
    }
}

fn validate_metrics(metrics: &MetricsConfig, errors: &mut Vec<String>) {
    if !metrics.is_enabled {
        return;
    }
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
        return;
    }
    if RESERVED_ROUTES
        .iter()
        .any(|route| metrics.path == *route || metrics.path.starts_with(&format!("{}/", route)))
    {
        errors.push(format!(
            "settings.metrics.path '{}' collides with a token route",
            metrics.path
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    let level = logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}

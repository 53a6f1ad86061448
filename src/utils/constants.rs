//! Shared constants and invariants

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// lifetime of a token when the request carries no `expiry`
pub const DEFAULT_EXPIRY_SECONDS: u32 = 3600;

// Environment variables holding the credentials
pub const ENV_APP_ID: &str = "APP_ID";
pub const ENV_APP_CERTIFICATE: &str = "APP_CERTIFICATE";

// Subject modes accepted on the rtc path
pub const TOKEN_TYPE_UID: &str = "uid";
pub const TOKEN_TYPE_USER_ACCOUNT: &str = "userAccount";

pub const ROLE_PUBLISHER: &str = "publisher";

// Route prefixes, reserved against the metrics path
pub const ROUTE_PING: &str = "/ping";
pub const ROUTE_RTC: &str = "/rtc";
pub const ROUTE_RTM: &str = "/rtm";
pub const ROUTE_RTE: &str = "/rte";

// Endpoint labels used in logs and metrics
pub const ENDPOINT_RTC: &str = "rtc";
pub const ENDPOINT_RTM: &str = "rtm";
pub const ENDPOINT_RTE: &str = "rte";

use std::fmt;

use thiserror::Error;

use crate::utils::constants::{ENV_APP_CERTIFICATE, ENV_APP_ID};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("ENV not properly configured, {0} is missing")]
    Missing(&'static str),

    #[error("ENV not properly configured, {0} is empty")]
    Empty(&'static str),
}

/// Application id and certificate, loaded once at startup and shared
/// read-only by every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    app_certificate: String,
}

impl Credentials {
    /// Both values must be present and non-empty.
    pub fn new(
        app_id: Option<String>,
        app_certificate: Option<String>,
    ) -> Result<Self, CredentialsError> {
        let app_id = require(ENV_APP_ID, app_id)?;
        let app_certificate = require(ENV_APP_CERTIFICATE, app_certificate)?;
        Ok(Self {
            app_id,
            app_certificate,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_certificate(&self) -> &str {
        &self.app_certificate
    }
}

fn require(name: &'static str, value: Option<String>) -> Result<String, CredentialsError> {
    match value {
        None => Err(CredentialsError::Missing(name)),
        Some(v) if v.trim().is_empty() => Err(CredentialsError::Empty(name)),
        Some(v) => Ok(v),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .finish()
    }
}

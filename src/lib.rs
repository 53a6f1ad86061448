//! # RTC Token Service Library
//!
//! Issues short-lived RTC (communication) and RTM (messaging) access
//! tokens over HTTP, signed with the application certificate.
//!
//! Modules:
//! - `config` — credentials, settings file loading and validation
//! - `parser` — request parameter parsing (role, subject, expiry)
//! - `token` — token types, errors, the signer trait and the HMAC signer
//! - `server` — axum router, handlers and error responses
//! - `observability` — prometheus metrics and the metrics route

pub mod config;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod server;
pub mod token;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::credentials::{Credentials, CredentialsError};
pub use crate::config::settings::ServiceConfig;
pub use crate::token::{AccessTokenSigner, TokenSigner};

//! Token domain: request types, errors and the signer seam.

pub mod access_token;
pub mod error;
pub mod signer;

use std::fmt;

pub use access_token::AccessTokenSigner;
pub use error::{ParseError, SignerError, TokenError};
pub use signer::{RtmRole, TokenSigner};

/// Privilege level embedded in a communication token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Publisher,
    Subscriber,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => write!(f, "publisher"),
            Role::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// How the subject of a communication token is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectMode {
    Uid,
    UserAccount,
}

/// Subject resolved for the communication signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcSubject {
    Uid(u32),
    Account(String),
}

/// Validated parameters of one token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub channel_name: String,
    pub role: Role,
    /// raw `tokenType` path segment, resolved on the rtc path only
    pub token_type: String,
    pub subject: String,
    /// absolute unix time, seconds
    pub expires_at: u32,
}

/// Parameters of a messaging token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingRequest {
    pub subject: String,
    pub expires_at: u32,
}

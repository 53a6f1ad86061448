use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to parse expireTime: {value}, causing error: {reason}")]
    InvalidExpiry { value: String, reason: String },

    #[error("expireTime {value} overflows the token timestamp")]
    ExpiryOverflow { value: String },

    #[error("failed to parse uidStr: {value} to uint causing error: {reason}")]
    InvalidUid { value: String, reason: String },
}

/// Opaque failure reported by a token signer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SignerError(pub String);

impl SignerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to generate RTC token for unknown tokenType: {0}")]
    UnsupportedTokenType(String),

    #[error(transparent)]
    Signer(#[from] SignerError),
}

impl TokenError {
    /// Label used in logs and the failure metric.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Parse(_) => "parse",
            TokenError::UnsupportedTokenType(_) => "unsupported_token_type",
            TokenError::Signer(_) => "signer",
        }
    }
}

use crate::config::credentials::Credentials;
use crate::token::error::SignerError;
use crate::token::{Role, RtcSubject};

/// Role embedded in a messaging token. The service only issues `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmRole {
    User,
}

/// Produces signed token strings. Handlers hold it as `Arc<dyn TokenSigner>`.
pub trait TokenSigner: Send + Sync {
    fn sign_communication_token(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        subject: &RtcSubject,
        role: Role,
        expires_at: u32,
    ) -> Result<String, SignerError>;

    fn sign_messaging_token(
        &self,
        credentials: &Credentials,
        subject: &str,
        role: RtmRole,
        expires_at: u32,
    ) -> Result<String, SignerError>;
}

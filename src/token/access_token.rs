//! HMAC-SHA256 access tokens.
//!
//! Layout:
//! - token   = VERSION | app_id | base64(content)
//! - content = u16 len | signature | u16 len | message
//! - message = salt: u32 | issued_at: u32 | u16 count | (privilege: u16, expires_at: u32)*
//!
//! All integers are little-endian. The signature is
//! `HMAC-SHA256(app_certificate, app_id | channel | account | message)`.
//! The layout is specific to this service, so tokens carry their own
//! version tag rather than a platform one.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::config::credentials::Credentials;
use crate::helpers::time::now_u32;
use crate::token::error::SignerError;
use crate::token::signer::{RtmRole, TokenSigner};
use crate::token::{Role, RtcSubject};

type HmacSha256 = Hmac<Sha256>;

pub const VERSION: &str = "rtk1";

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Privilege {
    JoinChannel = 1,
    PublishAudioStream = 2,
    PublishVideoStream = 3,
    PublishDataStream = 4,
    RtmLogin = 1000,
}

/// Privilege id -> expiry timestamp.
pub type Privileges = BTreeMap<u16, u32>;

/// Privileges granted by a communication token for `role`.
pub fn rtc_privileges(role: Role, expires_at: u32) -> Privileges {
    let mut privileges = Privileges::new();
    privileges.insert(Privilege::JoinChannel as u16, expires_at);
    if role == Role::Publisher {
        privileges.insert(Privilege::PublishAudioStream as u16, expires_at);
        privileges.insert(Privilege::PublishVideoStream as u16, expires_at);
        privileges.insert(Privilege::PublishDataStream as u16, expires_at);
    }
    privileges
}

pub fn rtm_privileges(role: RtmRole, expires_at: u32) -> Privileges {
    let mut privileges = Privileges::new();
    match role {
        RtmRole::User => {
            privileges.insert(Privilege::RtmLogin as u16, expires_at);
        }
    }
    privileges
}

/// Uid 0 is the wildcard uid and is signed as the empty account.
pub fn account_for(subject: &RtcSubject) -> String {
    match subject {
        RtcSubject::Uid(0) => String::new(),
        RtcSubject::Uid(uid) => uid.to_string(),
        RtcSubject::Account(account) => account.clone(),
    }
}

/// Signed part of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMessage {
    pub salt: u32,
    pub issued_at: u32,
    pub privileges: Privileges,
}

impl TokenMessage {
    fn pack(&self) -> Result<Vec<u8>, SignerError> {
        let count = u16::try_from(self.privileges.len())
            .map_err(|_| SignerError::new("too many privileges"))?;
        let mut buf = Vec::with_capacity(10 + self.privileges.len() * 6);
        buf.extend_from_slice(&self.salt.to_le_bytes());
        buf.extend_from_slice(&self.issued_at.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        for (key, value) in &self.privileges {
            buf.extend_from_slice(&key.to_le_bytes());
            buf.extend_from_slice(&value.to_le_bytes());
        }
        Ok(buf)
    }

    fn unpack(bytes: &[u8]) -> Result<Self, SignerError> {
        let mut reader = ByteReader::new(bytes);
        let salt = reader.read_u32()?;
        let issued_at = reader.read_u32()?;
        let count = reader.read_u16()?;
        let mut privileges = Privileges::new();
        for _ in 0..count {
            let key = reader.read_u16()?;
            let value = reader.read_u32()?;
            privileges.insert(key, value);
        }
        reader.finish()?;
        Ok(Self {
            salt,
            issued_at,
            privileges,
        })
    }
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SignerError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| SignerError::new("token is truncated"))?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn read_u16(&mut self) -> Result<u16, SignerError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, SignerError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_bytes(&mut self) -> Result<&'a [u8], SignerError> {
        let len = self.read_u16()? as usize;
        self.take(len)
    }

    fn finish(&self) -> Result<(), SignerError> {
        if self.pos == self.buf.len() {
            Ok(())
        } else {
            Err(SignerError::new("token has trailing bytes"))
        }
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), SignerError> {
    let len = u16::try_from(bytes.len()).map_err(|_| SignerError::new("field too long"))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn mac_for(
    credentials: &Credentials,
    channel_name: &str,
    account: &str,
    message: &[u8],
) -> Result<HmacSha256, SignerError> {
    let mut mac = HmacSha256::new_from_slice(credentials.app_certificate().as_bytes())
        .map_err(|e| SignerError::new(format!("invalid app certificate: {}", e)))?;
    mac.update(credentials.app_id().as_bytes());
    mac.update(channel_name.as_bytes());
    mac.update(account.as_bytes());
    mac.update(message);
    Ok(mac)
}

/// Default signer for the service.
#[derive(Debug, Clone, Default)]
pub struct AccessTokenSigner;

impl AccessTokenSigner {
    pub fn new() -> Self {
        Self
    }

    /// Sign `message` for `channel_name` / `account`.
    pub fn encode(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        account: &str,
        message: &TokenMessage,
    ) -> Result<String, SignerError> {
        if credentials.app_id().is_empty() || credentials.app_certificate().is_empty() {
            return Err(SignerError::new("app id and app certificate are required"));
        }

        let packed = message.pack()?;
        let signature = mac_for(credentials, channel_name, account, &packed)?
            .finalize()
            .into_bytes();

        let mut content = Vec::with_capacity(signature.len() + packed.len() + 4);
        write_bytes(&mut content, &signature)?;
        write_bytes(&mut content, &packed)?;

        Ok(format!(
            "{}{}{}",
            VERSION,
            credentials.app_id(),
            STANDARD.encode(content)
        ))
    }

    /// Check `token` against the signing inputs and return its message.
    pub fn verify(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        account: &str,
        token: &str,
    ) -> Result<TokenMessage, SignerError> {
        let encoded = token
            .strip_prefix(VERSION)
            .and_then(|rest| rest.strip_prefix(credentials.app_id()))
            .ok_or_else(|| SignerError::new("token version or app id mismatch"))?;
        let content = STANDARD
            .decode(encoded)
            .map_err(|e| SignerError::new(format!("token decode error: {}", e)))?;

        let mut reader = ByteReader::new(&content);
        let signature = reader.read_bytes()?;
        let packed = reader.read_bytes()?;
        reader.finish()?;

        mac_for(credentials, channel_name, account, packed)?
            .verify_slice(signature)
            .map_err(|_| SignerError::new("invalid token signature"))?;

        TokenMessage::unpack(packed)
    }

    fn sign(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        account: &str,
        privileges: Privileges,
    ) -> Result<String, SignerError> {
        let message = TokenMessage {
            salt: rand::thread_rng().gen_range(1..=99_999_999),
            issued_at: now_u32(),
            privileges,
        };
        self.encode(credentials, channel_name, account, &message)
    }
}

impl TokenSigner for AccessTokenSigner {
    fn sign_communication_token(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        subject: &RtcSubject,
        role: Role,
        expires_at: u32,
    ) -> Result<String, SignerError> {
        let account = account_for(subject);
        self.sign(
            credentials,
            channel_name,
            &account,
            rtc_privileges(role, expires_at),
        )
    }

    fn sign_messaging_token(
        &self,
        credentials: &Credentials,
        subject: &str,
        role: RtmRole,
        expires_at: u32,
    ) -> Result<String, SignerError> {
        self.sign(credentials, "", subject, rtm_privileges(role, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_ID: &str = "fixture-app-id";
    const APP_CERTIFICATE: &str = "fixture-app-certificate";

    fn credentials() -> Credentials {
        Credentials::new(Some(APP_ID.into()), Some(APP_CERTIFICATE.into())).unwrap()
    }

    #[test]
    fn encode_is_deterministic_for_fixed_message() {
        let signer = AccessTokenSigner::new();
        let message = TokenMessage {
            salt: 1,
            issued_at: 1_111_111,
            privileges: rtc_privileges(Role::Publisher, 1_446_455_471),
        };
        let a = signer.encode(&credentials(), "fixture-channel", "42", &message).unwrap();
        let b = signer.encode(&credentials(), "fixture-channel", "42", &message).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(&format!("{}{}", VERSION, APP_ID)));
    }

    #[test]
    fn tokens_carry_the_service_version_tag() {
        let signer = AccessTokenSigner::new();
        let token = signer
            .sign_messaging_token(&credentials(), "abc123", RtmRole::User, 1_446_455_471)
            .unwrap();
        assert!(token.starts_with("rtk1"), "{}", token);
        assert!(!token.starts_with("006"), "{}", token);
        assert!(signer.verify(&credentials(), "", "abc123", &token).is_ok());
    }

    #[test]
    fn communication_token_verifies_against_its_inputs() {
        let signer = AccessTokenSigner::new();
        let creds = credentials();
        let token = signer
            .sign_communication_token(&creds, "test", &RtcSubject::Uid(1234), Role::Publisher, 5_000)
            .unwrap();

        let message = signer.verify(&creds, "test", "1234", &token).unwrap();
        assert_eq!(message.privileges, rtc_privileges(Role::Publisher, 5_000));
        assert!(message.salt >= 1);
    }

    #[test]
    fn verify_rejects_other_channel_or_certificate() {
        let signer = AccessTokenSigner::new();
        let creds = credentials();
        let token = signer
            .sign_communication_token(&creds, "test", &RtcSubject::Uid(1234), Role::Subscriber, 5_000)
            .unwrap();

        assert!(signer.verify(&creds, "other", "1234", &token).is_err());

        let other = Credentials::new(Some(APP_ID.into()), Some("another-cert".into())).unwrap();
        let err = signer.verify(&other, "test", "1234", &token).unwrap_err();
        assert_eq!(err.to_string(), "invalid token signature");
    }

    #[test]
    fn verify_rejects_foreign_app_id() {
        let signer = AccessTokenSigner::new();
        let token = signer
            .sign_messaging_token(&credentials(), "alice", RtmRole::User, 10)
            .unwrap();
        let other = Credentials::new(Some("someone-else".into()), Some(APP_CERTIFICATE.into())).unwrap();
        assert!(signer.verify(&other, "", "alice", &token).is_err());
    }

    #[test]
    fn subscriber_only_joins() {
        let privileges = rtc_privileges(Role::Subscriber, 42);
        assert_eq!(privileges.len(), 1);
        assert_eq!(privileges.get(&(Privilege::JoinChannel as u16)), Some(&42));

        let publisher = rtc_privileges(Role::Publisher, 42);
        assert_eq!(publisher.len(), 4);
        assert_eq!(publisher.get(&(Privilege::PublishVideoStream as u16)), Some(&42));
    }

    #[test]
    fn wildcard_uid_signs_as_empty_account() {
        assert_eq!(account_for(&RtcSubject::Uid(0)), "");
        assert_eq!(account_for(&RtcSubject::Uid(7)), "7");
        assert_eq!(account_for(&RtcSubject::Account("bob".into())), "bob");

        let signer = AccessTokenSigner::new();
        let creds = credentials();
        let token = signer
            .sign_communication_token(&creds, "test", &RtcSubject::Uid(0), Role::Publisher, 99)
            .unwrap();
        assert!(signer.verify(&creds, "test", "", &token).is_ok());
    }

    #[test]
    fn messaging_token_grants_login() {
        let signer = AccessTokenSigner::new();
        let creds = credentials();
        let token = signer
            .sign_messaging_token(&creds, "abc123", RtmRole::User, 77)
            .unwrap();
        let message = signer.verify(&creds, "", "abc123", &token).unwrap();
        assert_eq!(
            message.privileges.get(&(Privilege::RtmLogin as u16)),
            Some(&77)
        );
    }

    #[test]
    fn truncated_token_is_rejected() {
        let signer = AccessTokenSigner::new();
        let creds = credentials();
        let token = signer
            .sign_messaging_token(&creds, "abc123", RtmRole::User, 77)
            .unwrap();
        let truncated = format!("{}{}{}", VERSION, APP_ID, STANDARD.encode([0x20u8, 0x00, 0x01]));
        assert!(signer.verify(&creds, "", "abc123", &truncated).is_err());
        assert!(signer.verify(&creds, "", "abc123", &token[..token.len() - 4]).is_err());
    }
}

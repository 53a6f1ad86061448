use serde::Deserialize;

use crate::token::{
    MessagingRequest, ParseError, Role, RtcSubject, SubjectMode, TokenError, TokenRequest,
};
use crate::utils::constants::{ROLE_PUBLISHER, TOKEN_TYPE_UID, TOKEN_TYPE_USER_ACCOUNT};

/// Path segments of the rtc and rte routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcPathParams {
    pub channel_name: String,
    pub role: String,
    pub token_type: String,
    pub uid: String,
}

/// Path segment of the rtm route.
#[derive(Debug, Clone, Deserialize)]
pub struct RtmPathParams {
    pub uid: String,
}

/// First value of `key` in a decoded query string; later repeats are ignored.
pub fn first_query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Only the exact string "publisher" grants publishing.
pub fn parse_role(raw: &str) -> Role {
    if raw == ROLE_PUBLISHER {
        Role::Publisher
    } else {
        Role::Subscriber
    }
}

pub fn parse_subject_mode(raw: &str) -> Option<SubjectMode> {
    match raw {
        TOKEN_TYPE_UID => Some(SubjectMode::Uid),
        TOKEN_TYPE_USER_ACCOUNT => Some(SubjectMode::UserAccount),
        _ => None,
    }
}

/// Plain decimal digits only; signs and whitespace are rejected.
fn parse_unsigned(raw: &str) -> Result<u32, String> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid syntax".to_string());
    }
    raw.parse::<u32>().map_err(|e| e.to_string())
}

/// Seconds from now, as an absolute unix timestamp.
pub fn parse_expiry(raw: &str, now: u32) -> Result<u32, ParseError> {
    let seconds = parse_unsigned(raw).map_err(|reason| ParseError::InvalidExpiry {
        value: raw.to_owned(),
        reason,
    })?;
    now.checked_add(seconds)
        .ok_or_else(|| ParseError::ExpiryOverflow {
            value: raw.to_owned(),
        })
}

fn expiry_or_default(
    expiry: Option<&str>,
    default_expiry_seconds: u32,
    now: u32,
) -> Result<u32, ParseError> {
    match expiry {
        Some(raw) => parse_expiry(raw, now),
        None => now
            .checked_add(default_expiry_seconds)
            .ok_or_else(|| ParseError::ExpiryOverflow {
                value: default_expiry_seconds.to_string(),
            }),
    }
}

pub fn parse_rtc_params(
    path: &RtcPathParams,
    expiry: Option<&str>,
    default_expiry_seconds: u32,
    now: u32,
) -> Result<TokenRequest, ParseError> {
    let expires_at = expiry_or_default(expiry, default_expiry_seconds, now)?;
    Ok(TokenRequest {
        channel_name: path.channel_name.clone(),
        role: parse_role(&path.role),
        token_type: path.token_type.clone(),
        subject: path.uid.clone(),
        expires_at,
    })
}

pub fn parse_rtm_params(
    path: &RtmPathParams,
    expiry: Option<&str>,
    default_expiry_seconds: u32,
    now: u32,
) -> Result<MessagingRequest, ParseError> {
    let expires_at = expiry_or_default(expiry, default_expiry_seconds, now)?;
    Ok(MessagingRequest {
        subject: path.uid.clone(),
        expires_at,
    })
}

/// Resolve the communication-token subject according to `token_type`.
pub fn resolve_subject(token_type: &str, subject: &str) -> Result<RtcSubject, TokenError> {
    match parse_subject_mode(token_type) {
        Some(SubjectMode::UserAccount) => Ok(RtcSubject::Account(subject.to_owned())),
        Some(SubjectMode::Uid) => parse_unsigned(subject)
            .map(RtcSubject::Uid)
            .map_err(|reason| {
                ParseError::InvalidUid {
                    value: subject.to_owned(),
                    reason,
                }
                .into()
            }),
        None => Err(TokenError::UnsupportedTokenType(token_type.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u32 = 1_700_000_000;

    fn rtc_path(role: &str, token_type: &str, uid: &str) -> RtcPathParams {
        RtcPathParams {
            channel_name: "test".into(),
            role: role.into(),
            token_type: token_type.into(),
            uid: uid.into(),
        }
    }

    #[test]
    fn first_expiry_wins() {
        let pairs = vec![
            ("other".to_string(), "1".to_string()),
            ("expiry".to_string(), "60".to_string()),
            ("expiry".to_string(), "70".to_string()),
        ];
        assert_eq!(first_query_value(&pairs, "expiry"), Some("60"));
        assert_eq!(first_query_value(&pairs, "missing"), None);

        let empty = vec![("expiry".to_string(), String::new())];
        assert_eq!(first_query_value(&empty, "expiry"), Some(""));
    }

    #[test]
    fn only_exact_publisher_publishes() {
        assert_eq!(parse_role("publisher"), Role::Publisher);
        for raw in ["", "Publisher", "PUBLISHER", "admin", "subscriber", " publisher"] {
            assert_eq!(parse_role(raw), Role::Subscriber, "role {:?}", raw);
        }
    }

    #[test]
    fn numeric_expiry_is_added_to_now() {
        assert_eq!(parse_expiry("3600", NOW).unwrap(), NOW + 3600);
        assert_eq!(parse_expiry("0", NOW).unwrap(), NOW);
        assert_eq!(parse_expiry("60", NOW + 1).unwrap(), NOW + 61);
    }

    #[test]
    fn non_numeric_expiry_fails() {
        for raw in ["", "abc", "-5", "+60", " 60", "1.5", "12x"] {
            let err = parse_expiry(raw, NOW).unwrap_err();
            assert!(
                matches!(&err, ParseError::InvalidExpiry { value, .. } if value == raw),
                "expiry {:?}",
                raw
            );
        }
    }

    #[test]
    fn expiry_past_u32_fails() {
        let err = parse_expiry("4294967295", NOW).unwrap_err();
        assert!(matches!(err, ParseError::ExpiryOverflow { .. }));
        assert!(matches!(
            parse_expiry("99999999999", NOW).unwrap_err(),
            ParseError::InvalidExpiry { .. }
        ));
    }

    #[test]
    fn missing_expiry_uses_default() {
        let request = parse_rtc_params(&rtc_path("publisher", "uid", "1"), None, 3600, NOW).unwrap();
        assert_eq!(request.expires_at, NOW + 3600);
        assert_eq!(request.role, Role::Publisher);
        assert_eq!(request.channel_name, "test");

        let rtm = parse_rtm_params(&RtmPathParams { uid: "abc".into() }, None, 120, NOW).unwrap();
        assert_eq!(rtm.expires_at, NOW + 120);
        assert_eq!(rtm.subject, "abc");
    }

    #[test]
    fn explicit_expiry_overrides_default() {
        let request =
            parse_rtc_params(&rtc_path("x", "uid", "1"), Some("60"), 3600, NOW).unwrap();
        assert_eq!(request.expires_at, NOW + 60);
        assert_eq!(request.role, Role::Subscriber);

        assert!(parse_rtm_params(&RtmPathParams { uid: "a".into() }, Some("soon"), 3600, NOW).is_err());
    }

    #[test]
    fn uid_mode_requires_numeric_subject() {
        assert_eq!(resolve_subject("uid", "1234").unwrap(), RtcSubject::Uid(1234));
        let err = resolve_subject("uid", "abc123").unwrap_err();
        assert!(matches!(err, TokenError::Parse(ParseError::InvalidUid { .. })));
        assert!(err.to_string().contains("abc123"));

        for signed in ["+1234", "-1234"] {
            let err = resolve_subject("uid", signed).unwrap_err();
            assert!(
                matches!(&err, TokenError::Parse(ParseError::InvalidUid { value, .. }) if value == signed),
                "uid {:?}",
                signed
            );
        }
    }

    #[test]
    fn account_mode_accepts_any_subject() {
        for subject in ["abc123", "1234", "user@example.com"] {
            assert_eq!(
                resolve_subject("userAccount", subject).unwrap(),
                RtcSubject::Account(subject.to_string())
            );
        }
    }

    #[test]
    fn other_token_types_are_unsupported() {
        for token_type in ["bogus", "UID", "useraccount", ""] {
            let err = resolve_subject(token_type, "1234").unwrap_err();
            assert!(matches!(err, TokenError::UnsupportedTokenType(_)));
            assert!(err.to_string().contains("unknown tokenType"));
        }
    }
}

//! Session claims decoded from the bearer token.
//!
//! The upstream API issues and cryptographically verifies tokens; this
//! gateway only reads the payload claims it needs for policy decisions.
//! Anything unparseable or expired degrades to an anonymous session, which
//! the access engine denies across the board.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::account::AccountId;
use super::role::Role;

/// Raw compact bearer token as presented by the caller.
///
/// ## Invariants
/// - Non-empty once trimmed; construction rejects blank input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Borrow the compact form for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Claims the policy core trusts from the token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Account the token was issued to.
    pub account: AccountId,
    /// Login name, used for display and audit logging only.
    pub username: String,
    /// The single role granted to the account.
    pub role: Role,
    /// Expiry instant, when the issuer included one.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Authentication state derived from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// A parseable, unexpired token with a known role.
    Authenticated(Claims),
    /// Missing, malformed, expired, or unknown-role token.
    Anonymous,
}

impl Session {
    /// Claims when authenticated.
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Authenticated(claims) => Some(claims),
            Self::Anonymous => None,
        }
    }

    /// Decode the payload segment of a compact JWS without verifying the
    /// signature; verification is the upstream issuer's job.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{AccessToken, Session};
    /// use chrono::Utc;
    ///
    /// let token = AccessToken::new("not.a.token").expect("non-empty");
    /// assert_eq!(Session::decode(&token, Utc::now()), Session::Anonymous);
    /// ```
    pub fn decode(token: &AccessToken, now: DateTime<Utc>) -> Self {
        let mut segments = token.as_str().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Self::Anonymous;
        };

        let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload) else {
            return Self::Anonymous;
        };
        let Ok(payload) = serde_json::from_slice::<PayloadDto>(&bytes) else {
            return Self::Anonymous;
        };

        let Some(role) = Role::from_wire(&payload.role) else {
            return Self::Anonymous;
        };

        let expires_at = payload.exp.and_then(|exp| DateTime::from_timestamp(exp, 0));
        if payload.exp.is_some() && expires_at.is_none() {
            // Unrepresentable expiry claim; treat the token as malformed.
            return Self::Anonymous;
        }
        if let Some(expiry) = expires_at
            && expiry <= now
        {
            return Self::Anonymous;
        }

        Self::Authenticated(Claims {
            account: AccountId(payload.id),
            username: payload.username,
            role,
            expires_at,
        })
    }
}

/// Decode an optional bearer token; a missing token is an anonymous session.
pub fn decode_optional(token: Option<&AccessToken>, now: DateTime<Utc>) -> Session {
    token.map_or(Session::Anonymous, |t| Session::decode(t, now))
}

#[derive(Debug, Deserialize)]
struct PayloadDto {
    id: i64,
    username: String,
    role: String,
    #[serde(default)]
    exp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn token_with_payload(payload: &serde_json::Value) -> AccessToken {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        AccessToken::new(format!("{header}.{body}.sig")).expect("non-empty token")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).single().expect("valid instant")
    }

    #[rstest]
    fn decodes_trusted_claims() {
        let token = token_with_payload(&json!({
            "id": 7,
            "username": "clerk",
            "role": "ROLE_FRONTDESK",
            "exp": now().timestamp() + 3_600,
        }));

        let session = Session::decode(&token, now());
        let claims = session.claims().expect("authenticated");
        assert_eq!(claims.account, AccountId(7));
        assert_eq!(claims.username, "clerk");
        assert_eq!(claims.role, Role::Frontdesk);
    }

    #[rstest]
    fn tokens_without_expiry_are_accepted() {
        let token = token_with_payload(&json!({
            "id": 1,
            "username": "boss",
            "role": "ROLE_MANAGER",
        }));

        let claims = Session::decode(&token, now());
        assert!(claims.claims().is_some());
    }

    #[rstest]
    fn expired_tokens_become_anonymous() {
        let token = token_with_payload(&json!({
            "id": 7,
            "username": "clerk",
            "role": "ROLE_FRONTDESK",
            "exp": now().timestamp() - 1,
        }));

        assert_eq!(Session::decode(&token, now()), Session::Anonymous);
    }

    #[rstest]
    fn unknown_roles_become_anonymous() {
        let token = token_with_payload(&json!({
            "id": 7,
            "username": "clerk",
            "role": "ROLE_INTERN",
        }));

        assert_eq!(Session::decode(&token, now()), Session::Anonymous);
    }

    #[rstest]
    #[case("garbage")]
    #[case("one.two")]
    #[case("one.two.three.four")]
    #[case("a.!!!not-base64!!!.c")]
    fn malformed_tokens_become_anonymous(#[case] raw: &str) {
        let token = AccessToken::new(raw).expect("non-empty");
        assert_eq!(Session::decode(&token, now()), Session::Anonymous);
    }

    #[rstest]
    fn blank_tokens_are_rejected_at_construction() {
        assert!(AccessToken::new("   ").is_none());
    }
}

//! Relay session tokens.
//!
//! Sessions are HS256 JWTs carrying a single scope (`feedback:append`) and a short
//! expiry. They authorize appends through the relay and nothing else; the store
//! credential itself never leaves the server.

use std::time::Duration;

use chrono::Utc;
use docsite_constant::feedback::{MIN_SESSION_SECRET_LEN, SESSION_SCOPE};
use docsite_feedback::Credential;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Who the session was minted for
    pub sub: String,
    pub scope: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

fn check_secret(secret: &Credential) -> Result<()> {
    if secret.expose().len() < MIN_SESSION_SECRET_LEN {
        return Err(RelayError::Config(format!(
            "session secret must be at least {} characters",
            MIN_SESSION_SECRET_LEN
        )));
    }
    Ok(())
}

/// Mints session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &Credential, ttl: Duration) -> Result<Self> {
        check_secret(secret)?;
        if ttl.is_zero() {
            return Err(RelayError::Config("session lifetime must be greater than zero".into()));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.expose().as_bytes()),
            ttl,
        })
    }

    pub fn mint(&self, subject: &str) -> Result<String> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(RelayError::Mint("subject must not be empty".into()));
        }
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: subject.to_string(),
            scope: SESSION_SCOPE.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| RelayError::Mint(e.to_string()))
    }
}

/// Verifies session tokens presented to the relay.
#[derive(Clone)]
pub struct SessionValidator {
    key: DecodingKey,
    validation: Validation,
}

impl SessionValidator {
    pub fn new(secret: &Credential) -> Result<Self> {
        check_secret(secret)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 5;
        Ok(Self {
            key: DecodingKey::from_secret(secret.expose().as_bytes()),
            validation,
        })
    }

    /// Signature, expiry and scope must all check out.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.scope != SESSION_SCOPE {
            return Err(RelayError::Unauthorized(format!(
                "session scope '{}' does not allow appending feedback",
                data.claims.scope
            )));
        }
        Ok(data.claims)
    }
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn secret(s: &str) -> Credential {
        Credential::new(s).unwrap()
    }

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&secret(SECRET), Duration::from_secs(900)).unwrap()
    }

    fn forge(claims: &Claims, key: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_mint_and_validate() {
        let token = issuer().mint("docs-team").unwrap();
        let claims = SessionValidator::new(&secret(SECRET)).unwrap().validate(&token).unwrap();
        assert_eq!(claims.sub, "docs-team");
        assert_eq!(claims.scope, "feedback:append");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().mint("docs-team").unwrap();
        let other = SessionValidator::new(&secret("another-secret-that-is-also-32-chars-long")).unwrap();
        assert!(matches!(other.validate(&token), Err(RelayError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_rejected() {
        let now = Utc::now().timestamp() as u64;
        let token = forge(
            &Claims {
                sub: "docs-team".into(),
                scope: SESSION_SCOPE.into(),
                iat: now - 7200,
                exp: now - 3600,
            },
            SECRET,
        );
        let err = SessionValidator::new(&secret(SECRET)).unwrap().validate(&token).unwrap_err();
        assert_eq!(err.to_string(), "unauthorized: session expired");
    }

    #[test]
    fn test_foreign_scope_rejected() {
        let now = Utc::now().timestamp() as u64;
        let token = forge(
            &Claims {
                sub: "docs-team".into(),
                scope: "repo:write".into(),
                iat: now,
                exp: now + 60,
            },
            SECRET,
        );
        let err = SessionValidator::new(&secret(SECRET)).unwrap().validate(&token).unwrap_err();
        assert!(err.to_string().contains("repo:write"));
    }

    #[test]
    fn test_secret_and_subject_checks() {
        assert!(SessionIssuer::new(&secret("short"), Duration::from_secs(60)).is_err());
        assert!(SessionValidator::new(&secret("short")).is_err());
        assert!(SessionIssuer::new(&secret(SECRET), Duration::ZERO).is_err());
        assert!(matches!(issuer().mint("  "), Err(RelayError::Mint(_))));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}

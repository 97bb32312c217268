//! Bearer credentials.
//!
//! A [`Credential`] lives for one read-modify-write cycle. It is never serialized,
//! its `Debug`/`Display` output is redacted and its memory is zeroed on drop.

use async_trait::async_trait;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// `None` for blank input, which callers treat as "declined".
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let mut secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            secret.zeroize();
            return None;
        }
        let credential = Self(trimmed.to_string());
        secret.zeroize();
        Some(credential)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Where a submission gets its credential. Asked once per attempt.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// `None` means the user declined.
    async fn request(&self) -> Option<Credential>;
}

/// Always hands out the same credential. Used server-side and in tests.
pub struct FixedCredential(Credential);

impl FixedCredential {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

#[async_trait]
impl CredentialSource for FixedCredential {
    async fn request(&self) -> Option<Credential> {
        Some(self.0.clone())
    }
}

/// Never hands out a credential.
pub struct Declined;

#[async_trait]
impl CredentialSource for Declined {
    async fn request(&self) -> Option<Credential> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_declined() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \n").is_none());
    }

    #[test]
    fn test_trimmed() {
        let c = Credential::new("  ghp_abc\n").unwrap();
        assert_eq!(c.expose(), "ghp_abc");
        assert_eq!(c.bearer(), "Bearer ghp_abc");
    }

    #[test]
    fn test_redacted_formatting() {
        let c = Credential::new("ghp_secret").unwrap();
        assert_eq!(format!("{:?}", c), "Credential([REDACTED])");
        assert_eq!(c.to_string(), "[REDACTED]");
        assert!(!format!("{:?} {}", c, c).contains("secret"));
    }

    #[test]
    fn test_sources() {
        let fixed = FixedCredential::new(Credential::new("t").unwrap());
        assert_eq!(tokio_test::block_on(fixed.request()).unwrap().expose(), "t");
        assert!(tokio_test::block_on(Declined.request()).is_none());
    }
}

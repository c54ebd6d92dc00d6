//! Anti-forgery token check for the count endpoint.

use crate::core::{BadgeError, Result};
use std::fmt;
use uuid::Uuid;

/// Page-lifetime anti-forgery token. Issued once, embedded into the page
/// configuration and echoed back by the client on every count query.
#[derive(Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_secret(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(BadgeError::Config("nonce must not be blank".to_string()));
        }
        Ok(Self(secret))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares without short-circuiting on the first differing byte.
    pub fn verify(&self, presented: Option<&str>) -> Result<()> {
        let Some(presented) = presented else {
            return Err(BadgeError::InvalidNonce);
        };

        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        let mut diff = expected.len() ^ presented.len();
        for (i, byte) in expected.iter().enumerate() {
            diff |= usize::from(byte ^ presented.get(i).copied().unwrap_or(0));
        }

        if diff == 0 {
            Ok(())
        } else {
            Err(BadgeError::InvalidNonce)
        }
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn verify_accepts_exact_match_only() {
        let nonce = Nonce::from_secret("abc123").unwrap();
        assert_ok!(nonce.verify(Some("abc123")));
        assert_err!(nonce.verify(Some("abc12")));
        assert_err!(nonce.verify(Some("abc1234")));
        assert_err!(nonce.verify(Some("")));
        assert_err!(nonce.verify(None));
    }

    #[test]
    fn generated_nonces_differ() {
        assert_ne!(Nonce::generate(), Nonce::generate());
    }

    #[test]
    fn blank_secret_rejected() {
        assert!(Nonce::from_secret("  ").is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let nonce = Nonce::from_secret("topsecret").unwrap();
        assert!(!format!("{nonce:?}").contains("topsecret"));
    }
}

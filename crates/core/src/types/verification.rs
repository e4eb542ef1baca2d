//! Email verification codes.
//!
//! Six-digit codes emailed during mobile signup. Only a SHA-256 hash of the
//! code is ever persisted; the plaintext exists in the issuing request and
//! the outbound email. Codes expire 24 hours after issuance and are
//! consumed on first successful verification.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How long an issued code stays valid.
const CODE_VALIDITY_HOURS: i64 = 24;

/// Errors from parsing a user-entered verification code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodeError {
    /// The code is not exactly six characters.
    #[error("verification code must be 6 digits")]
    WrongLength,
    /// The code contains a non-digit character.
    #[error("verification code must contain only digits")]
    NotNumeric,
}

/// A six-digit email verification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a fresh random code in the range 100000-999999.
    #[must_use]
    pub fn generate() -> Self {
        let n = rand::rng().random_range(100_000..1_000_000);
        Self(n.to_string())
    }

    /// Parse a user-entered code.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError`] if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let s = s.trim();
        if s.len() != 6 {
            return Err(CodeError::WrongLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NotNumeric);
        }
        Ok(Self(s.to_owned()))
    }

    /// The code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 hash of the code, hex encoded, as stored in the database.
    #[must_use]
    pub fn hash(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut out = String::with_capacity(64);
        for byte in digest {
            use fmt::Write;
            // Writing to a String cannot fail.
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// Check this code against a stored hash.
    #[must_use]
    pub fn matches_hash(&self, stored_hash: &str) -> bool {
        self.hash() == stored_hash
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expiry timestamp for a code issued now.
#[must_use]
pub fn verification_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(CODE_VALIDITY_HOURS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = VerificationCode::generate();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
            // Never starts with zero (range starts at 100000)
            assert_ne!(code.as_str().as_bytes()[0], b'0');
        }
    }

    #[test]
    fn parse_accepts_valid_codes() {
        assert_eq!(VerificationCode::parse("123456").unwrap().as_str(), "123456");
        // Whitespace is trimmed
        assert_eq!(VerificationCode::parse(" 654321 ").unwrap().as_str(), "654321");
    }

    #[test]
    fn parse_rejects_bad_codes() {
        assert!(matches!(
            VerificationCode::parse("12345"),
            Err(CodeError::WrongLength)
        ));
        assert!(matches!(
            VerificationCode::parse("1234567"),
            Err(CodeError::WrongLength)
        ));
        assert!(matches!(
            VerificationCode::parse("12a456"),
            Err(CodeError::NotNumeric)
        ));
    }

    #[test]
    fn hash_matches_itself_and_nothing_else() {
        let code = VerificationCode::parse("123456").unwrap();
        let hash = code.hash();
        assert_eq!(hash.len(), 64);
        assert!(code.matches_hash(&hash));

        let other = VerificationCode::parse("654321").unwrap();
        assert!(!other.matches_hash(&hash));
    }

    #[test]
    fn hash_is_stable_sha256() {
        // sha256("123456")
        let code = VerificationCode::parse("123456").unwrap();
        assert_eq!(
            code.hash(),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn expiry_is_24_hours_out() {
        let now = Utc::now();
        let expiry = verification_expiry(now);
        assert_eq!(expiry - now, Duration::hours(24));
    }
}

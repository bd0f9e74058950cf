//! Login credentials and password digests.
//!
//! Passwords never leave this module in clear text: stores keep a salted
//! SHA-256 digest and credentials zeroize their buffer on drop.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::EmailAddress;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// # Examples
/// ```
/// use lvhub::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Admin@Example.lv ", "secret").unwrap();
/// assert_eq!(creds.email().as_str(), "admin@example.lv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] for a malformed email or blank password.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookups.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Salted SHA-256 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    digest: String,
}

impl PasswordDigest {
    /// Hash `password` with `salt`.
    #[must_use]
    pub fn derive(salt: &str, password: &str) -> Self {
        Self {
            salt: salt.to_owned(),
            digest: digest_hex(salt, password),
        }
    }

    /// Check `password` against this digest.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest_hex(&self.salt, password);
        constant_time_eq(candidate.as_bytes(), self.digest.as_bytes())
    }
}

fn digest_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hex bytes of a secret's SHA-256 digest kept by [`secret_fingerprint`].
const FINGERPRINT_BYTES: usize = 4;

/// Short SHA-256 fingerprint (8 hex chars) safe to log or use as a map key
/// in place of a secret.
///
/// # Examples
/// ```
/// use lvhub::domain::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"admin-key-123");
/// assert_eq!(fp.len(), 8);
/// assert_eq!(fp, secret_fingerprint(b"admin-key-123"));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Compare two byte strings without short-circuiting on the first mismatch.
#[must_use]
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

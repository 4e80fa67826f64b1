//! Password hashing with Argon2id.
//!
//! Digests are stored in PHC string format so parameters and salt travel with
//! the hash and can be tuned without a data migration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};
use tracing::warn;

use super::Password;

/// PHC-formatted Argon2 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a PHC string loaded from a store.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Borrow the PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Hashing failed inside the Argon2 implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl From<password_hash::Error> for PasswordHashError {
    fn from(value: password_hash::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

/// Argon2id hasher shared by sign-up, update and login.
///
/// Hashing is CPU bound; the default parameters follow the OWASP baseline for
/// Argon2id (19 MiB, two passes, one lane).
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Build a hasher with explicit cost parameters.
    ///
    /// # Examples
    /// ```
    /// use argon2::Params;
    /// use user_auth_api::domain::{Password, PasswordHasher};
    ///
    /// let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid params");
    /// let hasher = PasswordHasher::new(params);
    /// let password = Password::new("s3cret").expect("valid password");
    /// let digest = hasher.hash(&password).expect("hashing succeeds");
    /// assert!(hasher.verify(&password, &digest));
    /// ```
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)?;
        Ok(PasswordDigest(hash.to_string()))
    }

    /// Check a password against a stored digest in constant time.
    ///
    /// An unparsable digest never matches.
    pub fn verify(&self, password: &Password, digest: &PasswordDigest) -> bool {
        let parsed = match PasswordHash::new(digest.as_str()) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(%error, "stored password digest is not a valid PHC string");
                return false;
            }
        };
        self.argon2
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the cost of one hash without producing anything.
    ///
    /// Login calls this when the username is unknown so that path takes as
    /// long as a password mismatch.
    pub fn equalise_timing(&self, password: &Password) {
        if let Err(error) = self.hash(password) {
            warn!(%error, "timing equaliser hash failed");
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

//! Token secret fingerprinting for operational visibility.
//!
//! Operators compare the logged fingerprint across replicas to confirm they
//! share a secret. The fingerprint is a truncated SHA-256 digest and reveals
//! nothing usable about the secret itself.

use sha2::{Digest, Sha256};

use crate::domain::TokenSecret;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Return the first 8 bytes of the secret's SHA-256 digest as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use user_auth_api::domain::TokenSecret;
/// use user_auth_api::inbound::http::token_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(&TokenSecret::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &TokenSecret) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

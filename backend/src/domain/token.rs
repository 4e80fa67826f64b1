//! Session token minting and verification.
//!
//! Tokens are compact JWS strings signed with HMAC-SHA256 under a single
//! process-wide secret. They carry the username, the issue instant and an
//! expiry five minutes later. Verification pins the algorithm before the
//! signature is checked, so a token whose header names any other scheme is
//! rejected outright.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::Username;

/// Lifetime of a freshly minted token.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// Length of secrets generated for development runs.
pub const GENERATED_SECRET_LEN: usize = 64;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Symmetric signing secret, wiped from memory on drop.
#[derive(Clone)]
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap secret bytes read from configuration.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate a random secret for processes that cannot load one.
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    /// Borrow the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    username: Username,
    iat: i64,
    exp: i64,
}

impl SessionClaims {
    /// Identity the token was issued to.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Issue instant as seconds since the Unix epoch.
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Expiry instant as seconds since the Unix epoch.
    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Signed session token returned by login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Borrow the compact serialisation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Take ownership of the compact serialisation.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Reasons a token could not be minted or accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is not a well-formed JWS or its claims do not parse.
    #[error("token is malformed: {message}")]
    Malformed { message: String },
    /// The header names a scheme other than HS256.
    #[error("token algorithm {algorithm} is not accepted")]
    AlgorithmMismatch { algorithm: String },
    /// The signature does not match the header and payload.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The current instant is past the expiry claim.
    #[error("token has expired")]
    Expired,
    /// Signing a new token failed.
    #[error("token signing failed: {message}")]
    Signing { message: String },
}

impl TokenError {
    /// Token text that cannot be decoded at all.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch {
            algorithm: "unexpected".to_owned(),
        },
        _ => TokenError::malformed(error.to_string()),
    }
}

/// Mints and verifies session tokens.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use user_auth_api::domain::{TokenCodec, TokenSecret, Username};
///
/// let codec = TokenCodec::new(&TokenSecret::generate(), Arc::new(DefaultClock));
/// let username = Username::new("ada").expect("valid username");
/// let token = codec.mint(&username).expect("mint");
/// let claims = codec.verify(token.as_str()).expect("verify");
/// assert_eq!(claims.username(), &username);
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Build a codec for the given secret. Tokens last [`TOKEN_VALIDITY`].
    pub fn new(secret: &TokenSecret, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity: TOKEN_VALIDITY,
            clock,
        }
    }

    /// Override the lifetime of minted tokens.
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Sign a token for `username` expiring one validity window from now.
    pub fn mint(&self, username: &Username) -> Result<AuthToken, TokenError> {
        let issued_at = self.clock.utc().timestamp();
        let lifetime = i64::try_from(self.validity.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            username: username.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(lifetime),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map(AuthToken)
            .map_err(|error| TokenError::Signing {
                message: error.to_string(),
            })
    }

    /// Parse and check a token, returning its claims.
    ///
    /// Checks run in order: structure, algorithm, signature, expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let header = decode_header(token).map_err(|error| TokenError::malformed(error.to_string()))?;
        if header.alg != ALGORITHM {
            return Err(TokenError::AlgorithmMismatch {
                algorithm: format!("{:?}", header.alg),
            });
        }

        let claims = decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(map_decode_error)?
            .claims;

        if self.clock.utc().timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

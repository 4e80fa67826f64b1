//! Driving port for exchanging credentials for a session token.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials};

/// Domain use-case port for logging in.
///
/// Unknown usernames and wrong passwords are indistinguishable to callers:
/// both fail with [`crate::domain::ErrorCode::InvalidCredentials`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check the credentials and mint a session token for the user.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;
}

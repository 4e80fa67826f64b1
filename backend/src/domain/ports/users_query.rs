//! Driving port for reading user records.

use async_trait::async_trait;

use crate::domain::{Country, Error, User, UserId};

/// Domain use-case port for user reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return every user.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Return one user, or a not-found error.
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// Return the distinct countries users live in, sorted.
    async fn list_countries(&self) -> Result<Vec<Country>, Error>;
}

//! Driving port for creating, changing and removing users.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, UserPatch, UserRegistration};

/// Domain use-case port for user writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Register a new user. A taken username is a conflict.
    async fn sign_up(&self, registration: &UserRegistration) -> Result<User, Error>;

    /// Replace the password and country of an existing user.
    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, Error>;

    /// Remove a user permanently.
    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;
}

//! User lifecycle service.
//!
//! Implements the login, query and command driving ports on top of any
//! [`UserRepository`]. Every operation addressed by identifier goes through
//! one resolution step so a missing record always surfaces the same way.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{
    AuthToken, Country, Error, LoginCredentials, NewUser, Password, PasswordDigest,
    PasswordHasher, TokenCodec, User, UserId, UserPatch, UserRegistration,
};

/// Message shared by every rejected login, whatever the cause.
pub(crate) const INVALID_CREDENTIALS: &str = "invalid credentials";

/// User service implementing the driving ports.
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
    tokens: Arc<TokenCodec>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    /// Create a service with the default Argon2 cost parameters.
    pub fn new(repo: Arc<R>, tokens: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            tokens,
            hasher: PasswordHasher::default(),
            clock,
        }
    }

    /// Replace the password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::internal(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Conflict { message } => {
                debug!(%message, "user write rejected by uniqueness constraint");
                Error::conflict("username already taken")
                    .with_details(json!({ "field": "username", "code": "username_taken" }))
            }
            UserPersistenceError::Missing { id } => Self::not_found(id),
        }
    }

    fn not_found(id: UserId) -> Error {
        Error::not_found("user not found").with_details(json!({ "id": id.as_i64() }))
    }

    /// Run Argon2 work on the blocking pool so request workers stay free.
    async fn with_hasher_blocking<T, F>(&self, password: &Password, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&PasswordHasher, &Password) -> T + Send + 'static,
    {
        let hasher = self.hasher.clone();
        let password = password.clone();
        tokio::task::spawn_blocking(move || work(&hasher, &password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))
    }

    async fn hash(&self, password: &Password) -> Result<PasswordDigest, Error> {
        self.with_hasher_blocking(password, |hasher, password| hasher.hash(password))
            .await?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify(&self, password: &Password, digest: &PasswordDigest) -> Result<bool, Error> {
        let digest = digest.clone();
        self.with_hasher_blocking(password, move |hasher, password| {
            hasher.verify(password, &digest)
        })
        .await
    }

    async fn equalise_timing(&self, password: &Password) -> Result<(), Error> {
        self.with_hasher_blocking(password, |hasher, password| {
            hasher.equalise_timing(password);
        })
        .await
    }

    async fn resolve(&self, id: &UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::not_found(*id))
    }
}

#[async_trait]
impl<R> LoginService for UserService<R>
where
    R: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let username = credentials.username();
        let found = self
            .repo
            .find_by_username(username)
            .await
            .map_err(Self::map_persistence_error)?;

        let Some(user) = found else {
            self.equalise_timing(credentials.password()).await?;
            debug!(%username, "login rejected: unknown username");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        };

        if !self
            .verify(credentials.password(), user.password_digest())
            .await?
        {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .mint(user.username())
            .map_err(|err| Error::internal(format!("failed to issue session token: {err}")))?;
        info!(user_id = %user.id(), "user logged in");
        Ok(token)
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repo.list().await.map_err(Self::map_persistence_error)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.resolve(id).await
    }

    async fn list_countries(&self) -> Result<Vec<Country>, Error> {
        self.repo
            .distinct_countries()
            .await
            .map_err(Self::map_persistence_error)
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn sign_up(&self, registration: &UserRegistration) -> Result<User, Error> {
        let new_user = NewUser {
            username: registration.username().clone(),
            password_digest: self.hash(registration.password()).await?,
            country: registration.country().clone(),
        };

        let user = self
            .repo
            .create(&new_user)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user signed up");
        Ok(user)
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, Error> {
        let existing = self.resolve(id).await?;
        let merged = existing.with_changes(
            self.hash(patch.password()).await?,
            patch.country().clone(),
            self.clock.utc(),
        );

        self.repo
            .save(&merged)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %id, "user updated");
        Ok(merged)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        let existing = self.resolve(id).await?;
        self.repo
            .delete(&existing.id())
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

//! Driven port for the credential store.
//!
//! A missing record is an `Ok(None)` from the lookups, never an error, so the
//! service can tell "not found" apart from a failing store without inspecting
//! messages.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Country, NewUser, User, UserId, Username};

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "user repository conflict: {message}",
        /// The addressed record vanished before a save or delete reached it.
        Missing { id: UserId } => "user {id} no longer exists",
    }
}

/// Persistence port for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new record and return it with its store-assigned fields.
    ///
    /// A taken username yields [`UserPersistenceError::Conflict`].
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Look a record up by its unique username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Look a record up by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Return every record ordered by identifier.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Overwrite the mutable fields of an existing record.
    async fn save(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a record permanently.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;

    /// Return the distinct countries across all records, sorted.
    async fn distinct_countries(&self) -> Result<Vec<Country>, UserPersistenceError>;
}

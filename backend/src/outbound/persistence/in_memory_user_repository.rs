//! Process-local `UserRepository` used when no database is configured.
//!
//! Mirrors the PostgreSQL adapter's observable behaviour: identifiers come
//! from a monotonically increasing counter, usernames are unique and records
//! list in identifier order. Data does not survive a restart.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Country, NewUser, User, UserId, Username};

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    rows: BTreeMap<UserId, User>,
}

/// In-memory implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    /// Create an empty repository stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, UserPersistenceError> {
        self.store
            .lock()
            .map_err(|_| UserPersistenceError::connection("in-memory user store poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut store = self.lock()?;
        if store
            .rows
            .values()
            .any(|existing| existing.username() == &user.username)
        {
            return Err(UserPersistenceError::conflict("users_username_key"));
        }

        let id = UserId::new(store.last_id + 1)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let now = self.clock.utc();
        let created = User::new(id, user.clone(), now, now);
        store.last_id = id.as_i64();
        store.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let store = self.lock()?;
        Ok(store
            .rows
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.rows.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    async fn save(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut store = self.lock()?;
        match store.rows.get_mut(&user.id()) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::missing(user.id())),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.lock()?
            .rows
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserPersistenceError::missing(*id))
    }

    async fn distinct_countries(&self) -> Result<Vec<Country>, UserPersistenceError> {
        let store = self.lock()?;
        let mut countries: Vec<Country> = store
            .rows
            .values()
            .map(|user| user.country().clone())
            .collect();
        countries.sort();
        countries.dedup();
        Ok(countries)
    }
}

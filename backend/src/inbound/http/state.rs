//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// A single `UserService` usually backs all three.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use user_auth_api::domain::{TokenCodec, TokenSecret, UserService};
    /// use user_auth_api::inbound::http::state::HttpState;
    /// use user_auth_api::outbound::persistence::InMemoryUserRepository;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let codec = Arc::new(TokenCodec::new(&TokenSecret::generate(), clock.clone()));
    /// let repo = Arc::new(InMemoryUserRepository::new(clock.clone()));
    /// let service = Arc::new(UserService::new(repo, codec, clock));
    /// let state = HttpState::new(service.clone(), service.clone(), service);
    /// let _login = state.login.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
    ) -> Self {
        Self {
            login,
            users,
            users_command,
        }
    }
}

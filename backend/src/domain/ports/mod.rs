//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to reach the credential
//! store; driving ports describe the use-cases inbound adapters may call.
//! Each driven port exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of stringly typed errors.

mod macros;
mod login_service;
mod user_repository;
mod users_command;
mod users_query;

use macros::define_port_error;

pub use login_service::LoginService;
pub use user_repository::{UserPersistenceError, UserRepository};
pub use users_command::UsersCommand;
pub use users_query::UsersQuery;

#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use users_command::MockUsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;

//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth_guard;
pub mod error;
pub mod health;
pub mod state;
pub mod token_config;
pub mod users;
pub mod validation;

pub use error::ApiResult;

//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the service that drives the user lifecycle.
//! Types validate on construction so downstream code never re-checks them.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): stored user record.
//! - TokenCodec (alias to `token::TokenCodec`): session token minting and
//!   verification.
//! - UserService (alias to `user_service::UserService`): implementation of
//!   the driving ports over a user repository.

pub mod auth;
pub mod error;
pub mod password;
pub mod ports;
pub mod token;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::LoginCredentials;
pub use self::error::{Error, ErrorCode};
pub use self::password::{PasswordDigest, PasswordHashError, PasswordHasher};
pub use self::token::{
    AuthToken, SessionClaims, TOKEN_VALIDITY, TokenCodec, TokenError, TokenSecret,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    COUNTRY_MAX, Country, NewUser, PASSWORD_MAX, Password, USERNAME_MAX, User, UserId, UserPatch,
    UserRegistration, UserValidationError, Username,
};
pub use self::user_service::UserService;

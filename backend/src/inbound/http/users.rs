//! Account and user-management HTTP handlers.
//!
//! ```text
//! POST   /signup          {"username","password","country"}
//! POST   /login           {"username","password"}
//! GET    /users           (token required)
//! GET    /users/{id}      (token required)
//! PUT    /users/{id}      {"password","country"} (token required)
//! DELETE /users/{id}      (token required)
//! GET    /countries       (token required)
//! ```
//!
//! Successful responses wrap their payload in `{"data": ...}`; login returns
//! `{"token": ...}`. Stored password digests never leave the service.

use std::str::FromStr;

use actix_web::{delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::user_service::INVALID_CREDENTIALS;
use crate::domain::{LoginCredentials, User, UserId, UserPatch, UserRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth_guard::{AuthGuard, AuthenticatedUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_validation_error, require};

const USERNAME_FIELD: FieldName = FieldName::new("username");
const PASSWORD_FIELD: FieldName = FieldName::new("password");
const COUNTRY_FIELD: FieldName = FieldName::new("country");
const USER_DELETED: &str = "User deleted";

/// Success envelope shared by the data-returning endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    fn wrap(data: T) -> web::Json<Self> {
        web::Json(Self { data })
    }
}

/// Public projection of a stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "UK")]
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            username: user.username().to_string(),
            country: user.country().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Signup request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
    #[schema(example = "UK")]
    pub country: Option<String>,
}

impl TryFrom<SignupRequest> for UserRegistration {
    type Error = crate::domain::Error;

    fn try_from(body: SignupRequest) -> Result<Self, Self::Error> {
        let username = require(body.username, USERNAME_FIELD)?;
        let password = require(body.password, PASSWORD_FIELD)?;
        let country = require(body.country, COUNTRY_FIELD)?;
        UserRegistration::try_from_parts(&username, &password, &country)
            .map_err(map_validation_error)
    }
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
}

/// Only absent fields are request errors. A username no account could hold
/// is a failed login like any other.
impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = crate::domain::Error;

    fn try_from(body: LoginRequest) -> Result<Self, Self::Error> {
        let username = require(body.username, USERNAME_FIELD)?;
        let password = require(body.password, PASSWORD_FIELD)?;
        LoginCredentials::try_from_parts(&username, &password).map_err(|reason| {
            debug!(%reason, "login rejected before lookup");
            crate::domain::Error::invalid_credentials(INVALID_CREDENTIALS)
        })
    }
}

/// Update request body.
///
/// A `username` member is accepted and ignored; usernames never change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "new password")]
    pub password: Option<String>,
    #[schema(example = "Chile")]
    pub country: Option<String>,
    #[schema(ignore)]
    pub username: Option<serde_json::Value>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = crate::domain::Error;

    fn try_from(body: UpdateUserRequest) -> Result<Self, Self::Error> {
        let password = require(body.password, PASSWORD_FIELD)?;
        let country = require(body.country, COUNTRY_FIELD)?;
        UserPatch::try_from_parts(&password, &country).map_err(map_validation_error)
    }
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Compact HS256 token valid for five minutes. Send it verbatim as the
    /// `Authorization` header value.
    pub token: String,
}

fn parse_id(raw: &str) -> ApiResult<UserId> {
    UserId::from_str(raw).map_err(map_validation_error)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 409, description = "Username already taken", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let registration = UserRegistration::try_from(payload.into_inner())?;
    let user = state.users_command.sign_up(&registration).await?;
    Ok(Envelope::wrap(UserResponse::from(&user)))
}

/// Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Malformed body or missing field", body = crate::domain::Error),
        (status = 401, description = "Invalid credentials", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let token = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: token.into_inner(),
    }))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = Envelope<Vec<UserResponse>>),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("Authorization" = []))
)]
#[get("")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<Vec<UserResponse>>>> {
    let users = state.users.list_users().await?;
    Ok(Envelope::wrap(users.iter().map(UserResponse::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = Envelope<UserResponse>),
        (status = 400, description = "Malformed identifier", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 404, description = "No such user", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("Authorization" = []))
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let id = parse_id(&path)?;
    let user = state.users.get_user(&id).await?;
    Ok(Envelope::wrap(UserResponse::from(&user)))
}

/// Replace a user's password and country.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 404, description = "No such user", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("Authorization" = []))
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let id = parse_id(&path)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state.users_command.update_user(&id, &patch).await?;
    debug!(caller = %caller.username(), user_id = %id, "update applied");
    Ok(Envelope::wrap(UserResponse::from(&user)))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = Envelope<String>),
        (status = 400, description = "Malformed identifier", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 404, description = "No such user", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("Authorization" = []))
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<&'static str>>> {
    let id = parse_id(&path)?;
    state.users_command.delete_user(&id).await?;
    debug!(caller = %caller.username(), user_id = %id, "delete applied");
    Ok(Envelope::wrap(USER_DELETED))
}

/// Distinct countries across all users, sorted.
#[utoipa::path(
    get,
    path = "/countries",
    responses(
        (status = 200, description = "Countries", body = Envelope<Vec<String>>),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "listCountries",
    security(("Authorization" = []))
)]
#[get("")]
pub async fn list_countries(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<Vec<String>>>> {
    let countries = state.users.list_countries().await?;
    Ok(Envelope::wrap(countries.into_iter().map(String::from).collect()))
}

/// Register the account routes, guarding everything but signup and login.
pub fn configure(cfg: &mut web::ServiceConfig, guard: AuthGuard) {
    cfg.service(sign_up)
        .service(login)
        .service(
            web::scope("/users")
                .wrap(guard.clone())
                .service(list_users)
                .service(get_user)
                .service(update_user)
                .service(delete_user),
        )
        .service(web::scope("/countries").wrap(guard).service(list_countries));
}

#[cfg(test)]
mod tests;

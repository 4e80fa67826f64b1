//! User record and the validated values it is built from.
//!
//! Inbound adapters construct these types from raw strings; once built, a
//! value is known to satisfy its invariants, so services never re-check them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::PasswordDigest;

/// Maximum length, in characters, of a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum length, in characters, of a password.
pub const PASSWORD_MAX: usize = 64;
/// Maximum length, in characters, of a country name.
pub const COUNTRY_MAX: usize = 64;

/// Validation errors raised while building user values from raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptyPassword,
    PasswordTooLong { max: usize },
    EmptyCountry,
    CountryTooLong { max: usize },
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyUsername | Self::UsernameTooLong { .. } => "username",
            Self::EmptyPassword | Self::PasswordTooLong { .. } => "password",
            Self::EmptyCountry | Self::CountryTooLong { .. } => "country",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyUsername => "empty_username",
            Self::UsernameTooLong { .. } => "username_too_long",
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooLong { .. } => "password_too_long",
            Self::EmptyCountry => "empty_country",
            Self::CountryTooLong { .. } => "country_too_long",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a positive integer"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::EmptyCountry => write!(f, "country must not be empty"),
            Self::CountryTooLong { max } => write!(f, "country must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned surrogate key of a user record.
///
/// # Examples
/// ```
/// use user_auth_api::domain::UserId;
///
/// let id: UserId = "42".parse().expect("numeric id");
/// assert_eq!(id.as_i64(), 42);
/// assert!("abc".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier. Identifiers start at one.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw < 1 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<i64>()
            .map_err(|_| UserValidationError::InvalidId)?;
        Self::new(raw)
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

fn bounded_trimmed(
    raw: &str,
    max: usize,
    empty: UserValidationError,
    too_long: UserValidationError,
) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Unique login name, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        bounded_trimmed(
            raw.as_ref(),
            USERNAME_MAX,
            UserValidationError::EmptyUsername,
            UserValidationError::UsernameTooLong { max: USERNAME_MAX },
        )
        .map(Self)
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Country of residence, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Country(String);

impl Country {
    /// Validate and construct a country.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        bounded_trimmed(
            raw.as_ref(),
            COUNTRY_MAX,
            UserValidationError::EmptyCountry,
            UserValidationError::CountryTooLong { max: COUNTRY_MAX },
        )
        .map(Self)
    }

    /// Borrow the country name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Country {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Country {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Country> for String {
    fn from(value: Country) -> Self {
        value.0
    }
}

/// Plaintext password as supplied by a caller.
///
/// Whitespace is preserved. The buffer is wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and wrap a plaintext password.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        if raw.chars().count() > PASSWORD_MAX {
            return Err(UserValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Wrap a password offered for verification without the sign-up rules.
    ///
    /// Digests only exist for passwords that passed [`Password::new`], so a
    /// value outside those rules can never verify.
    pub fn presented(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated sign-up request.
///
/// # Examples
/// ```
/// use user_auth_api::domain::UserRegistration;
///
/// let reg = UserRegistration::try_from_parts(" ada ", "s3cret", "UK").expect("valid");
/// assert_eq!(reg.username().as_str(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistration {
    username: Username,
    password: Password,
    country: Country,
}

impl UserRegistration {
    /// Validate raw sign-up fields, checking username, password and country in
    /// that order.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        country: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            country: Country::new(country)?,
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested password.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Declared country.
    pub fn country(&self) -> &Country {
        &self.country
    }
}

/// Validated changes for an existing user. Only these fields are mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    password: Password,
    country: Country,
}

impl UserPatch {
    /// Validate raw update fields.
    pub fn try_from_parts(password: &str, country: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            password: Password::new(password)?,
            country: Country::new(country)?,
        })
    }

    /// Replacement password.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Replacement country.
    pub fn country(&self) -> &Country {
        &self.country
    }
}

/// Values handed to the credential store when creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub password_digest: PasswordDigest,
    pub country: Country,
}

/// Persisted user record.
///
/// ## Invariants
/// - `id` and `username` never change after creation.
/// - `password_digest` is a hashed credential; plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_digest: PasswordDigest,
    country: Country,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Reassemble a record loaded from a store.
    pub fn new(
        id: UserId,
        new_user: NewUser,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let NewUser {
            username,
            password_digest,
            country,
        } = new_user;
        Self {
            id,
            username,
            password_digest,
            country,
            created_at,
            updated_at,
        }
    }

    /// Return a copy carrying the new credential and country. Identity fields
    /// are kept as they are.
    #[must_use]
    pub fn with_changes(
        &self,
        password_digest: PasswordDigest,
        country: Country,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            password_digest,
            country,
            updated_at,
            ..self.clone()
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Hashed credential.
    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    /// Country of residence.
    pub fn country(&self) -> &Country {
        &self.country
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

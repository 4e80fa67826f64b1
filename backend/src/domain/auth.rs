//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use super::{Password, UserValidationError, Username};

/// Validated login credentials used by the login use-case.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is kept exactly as presented. Sign-up rules are not applied;
///   a value that breaks them simply never matches a stored digest.
///
/// # Examples
/// ```
/// use user_auth_api::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "s3cret").unwrap();
/// assert_eq!(creds.username().as_str(), "ada");
/// assert_eq!(creds.password().expose(), "s3cret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::presented(password),
        })
    }

    /// Username used for the store lookup.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", UserValidationError::EmptyUsername)]
    #[case("   ", "pw", UserValidationError::EmptyUsername)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  admin  ", "secret")]
    #[case("alice", " correct horse battery staple ")]
    fn valid_credentials_trim_username_only(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username().as_str(), username.trim());
        assert_eq!(creds.password().expose(), password);
    }

    #[rstest]
    #[case::empty(String::new())]
    #[case::over_sign_up_limit("p".repeat(crate::domain::PASSWORD_MAX + 1))]
    fn presented_passwords_skip_sign_up_rules(#[case] password: String) {
        let creds = LoginCredentials::try_from_parts("ada", &password)
            .expect("any presented password is accepted");
        assert_eq!(creds.password().expose(), password);
    }
}

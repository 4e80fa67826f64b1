//! Unit tests for token secret configuration.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug)]
struct TempSecretFile {
    path: PathBuf,
}

impl TempSecretFile {
    fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("token-secret-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b's'; len])?;
        Ok(Self { path })
    }

    fn path_str(&self) -> &str {
        self.path
            .to_str()
            .expect("temporary path should be valid UTF-8")
    }
}

impl Drop for TempSecretFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn missing_path() -> String {
    std::env::temp_dir()
        .join(format!("absent-secret-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned()
}

#[rstest]
fn release_reads_secret_file() {
    let file = TempSecretFile::new(TOKEN_SECRET_MIN_LEN).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, file.path_str().to_owned())]));

    let settings = token_settings_from_env(&env, BuildMode::Release).expect("valid secret");

    assert_eq!(settings.source, SecretSource::File);
    assert_eq!(settings.secret.as_bytes(), vec![b's'; TOKEN_SECRET_MIN_LEN]);
}

#[rstest]
fn release_rejects_short_secret() {
    let file = TempSecretFile::new(TOKEN_SECRET_MIN_LEN - 1).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, file.path_str().to_owned())]));

    let err = token_settings_from_env(&env, BuildMode::Release).expect_err("short secret");

    assert!(matches!(
        err,
        TokenConfigError::SecretTooShort { length, min_len, .. }
            if length == TOKEN_SECRET_MIN_LEN - 1 && min_len == TOKEN_SECRET_MIN_LEN
    ));
}

#[rstest]
fn debug_accepts_short_secret() {
    let file = TempSecretFile::new(8).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, file.path_str().to_owned())]));

    let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");

    assert_eq!(settings.source, SecretSource::File);
    assert_eq!(settings.secret.as_bytes().len(), 8);
}

#[rstest]
#[case(BuildMode::Debug)]
#[case(BuildMode::Release)]
fn empty_secret_is_always_rejected(#[case] mode: BuildMode) {
    let file = TempSecretFile::new(0).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, file.path_str().to_owned())]));

    let err = token_settings_from_env(&env, mode).expect_err("empty secret");
    assert!(matches!(err, TokenConfigError::SecretTooShort { length: 0, .. }));
}

#[rstest]
fn release_missing_secret_is_rejected() {
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, missing_path())]));

    let err = token_settings_from_env(&env, BuildMode::Release).expect_err("missing secret");
    assert!(matches!(err, TokenConfigError::SecretRead { .. }));
}

#[rstest]
fn debug_missing_secret_falls_back_to_ephemeral() {
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, missing_path())]));

    let settings = token_settings_from_env(&env, BuildMode::Debug).expect("ephemeral");

    assert_eq!(settings.source, SecretSource::Ephemeral);
    assert_eq!(
        settings.secret.as_bytes().len(),
        crate::domain::token::GENERATED_SECRET_LEN
    );
}

#[rstest]
#[case("1")]
#[case("true")]
fn release_refuses_ephemeral_toggle(#[case] value: &str) {
    let env = mock_env(HashMap::from([(ALLOW_EPHEMERAL_ENV, value.to_owned())]));

    let err = token_settings_from_env(&env, BuildMode::Release).expect_err("toggle refused");
    assert!(matches!(err, TokenConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_malformed_toggle() {
    let env = mock_env(HashMap::from([(ALLOW_EPHEMERAL_ENV, "maybe".to_owned())]));

    let err = token_settings_from_env(&env, BuildMode::Release).expect_err("bad toggle");
    assert!(matches!(
        err,
        TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            ..
        }
    ));
}

#[rstest]
#[case("1", Some(true))]
#[case(" YES ", Some(true))]
#[case("n", Some(false))]
#[case("0", Some(false))]
#[case("sometimes", None)]
fn parse_bool_accepts_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}

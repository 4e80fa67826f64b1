//! Tests for account and user-management handlers.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockLoginService, MockUsersCommand, MockUsersQuery};
use crate::domain::{
    Country, Error, NewUser, PasswordDigest, TokenCodec, TokenSecret, Username,
};
use crate::inbound::http::validation::{json_config, path_config};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test};
use chrono::TimeZone;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

struct Mocks {
    login: MockLoginService,
    users: MockUsersQuery,
    command: MockUsersCommand,
}

impl Mocks {
    fn new() -> Self {
        Self {
            login: MockLoginService::new(),
            users: MockUsersQuery::new(),
            command: MockUsersCommand::new(),
        }
    }
}

fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(
        &TokenSecret::new(b"handler-tests-secret-0123456789ab".to_vec()),
        Arc::new(DefaultClock),
    ))
}

fn bearer_free_token(codec: &TokenCodec) -> String {
    codec
        .mint(&Username::new("caller").expect("valid username"))
        .expect("mint")
        .into_inner()
}

fn test_app(
    mocks: Mocks,
    codec: Arc<TokenCodec>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(mocks.login),
        Arc::new(mocks.users),
        Arc::new(mocks.command),
    );
    let guard = AuthGuard::new(codec);
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(path_config())
        .configure(move |cfg| configure(cfg, guard))
}

fn user(id: i64, username: &str, country: &str) -> User {
    let stamp = Utc
        .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
        .single()
        .expect("valid timestamp");
    User::new(
        UserId::new(id).expect("valid id"),
        NewUser {
            username: Username::new(username).expect("valid username"),
            password_digest: PasswordDigest::from_phc("$argon2id$fixture"),
            country: Country::new(country).expect("valid country"),
        },
        stamp,
        stamp,
    )
}

async fn send(
    mocks: Mocks,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let codec = codec();
    let token = bearer_free_token(&codec);
    let app = actix_test::init_service(test_app(mocks, codec)).await;
    let request = request.insert_header((AUTHORIZATION, token)).to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn assert_validation(body: &Value, field: &str, code: &str) {
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn sign_up_returns_created_user_without_password() {
    let mut mocks = Mocks::new();
    mocks
        .command
        .expect_sign_up()
        .withf(|registration| {
            registration.username().as_str() == "ada"
                && registration.password().expose() == "s3cret"
                && registration.country().as_str() == "UK"
        })
        .times(1)
        .return_once(|_| Ok(user(1, "ada", "UK")));

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post().uri("/signup").set_json(json!({
            "username": "ada",
            "password": "s3cret",
            "country": "UK"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["country"], "UK");
    assert_eq!(body["data"]["createdAt"], "2026-01-02T03:04:05Z");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
}

#[rstest]
#[case(json!({"password": "pw", "country": "UK"}), "username", "missing_field")]
#[case(json!({"username": "ada", "country": "UK"}), "password", "missing_field")]
#[case(json!({"username": "ada", "password": "pw"}), "country", "missing_field")]
#[case(json!({"username": " ", "password": "pw", "country": "UK"}), "username", "empty_username")]
#[case(json!({"username": "ada", "password": "p".repeat(65), "country": "UK"}), "password", "password_too_long")]
#[case(json!({"username": "ada", "password": "pw", "country": "c".repeat(65)}), "country", "country_too_long")]
#[actix_web::test]
async fn sign_up_rejects_invalid_bodies_before_the_service(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut mocks = Mocks::new();
    mocks.command.expect_sign_up().times(0);

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post()
            .uri("/signup")
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, field, code);
}

#[actix_web::test]
async fn sign_up_of_taken_username_is_conflict() {
    let mut mocks = Mocks::new();
    mocks
        .command
        .expect_sign_up()
        .times(1)
        .return_once(|_| Err(Error::conflict("username already taken")));

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post().uri("/signup").set_json(json!({
            "username": "ada",
            "password": "pw",
            "country": "UK"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn malformed_json_is_invalid_request() {
    let (status, body) = send(
        Mocks::new(),
        actix_test::TestRequest::post()
            .uri("/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_json");
}

#[actix_web::test]
async fn login_returns_token_field() {
    let mut mocks = Mocks::new();
    mocks
        .login
        .expect_login()
        .withf(|credentials| {
            credentials.username().as_str() == "ada" && credentials.password().expose() == "pw"
        })
        .times(1)
        .return_once(|_| {
            Ok(codec()
                .mint(&Username::new("ada").expect("valid username"))
                .expect("mint"))
        });

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "ada", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token string");
    assert_eq!(token.split('.').count(), 3);
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn login_with_bad_credentials_is_unauthorised() {
    let mut mocks = Mocks::new();
    mocks
        .login
        .expect_login()
        .times(1)
        .return_once(|_| Err(Error::invalid_credentials("invalid credentials")));

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "ada", "password": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
    assert_eq!(body["message"], "invalid credentials");
}

#[actix_web::test]
async fn login_passes_over_long_password_to_the_service() {
    let over_long = "p".repeat(crate::domain::PASSWORD_MAX + 1);
    let expected = over_long.clone();
    let mut mocks = Mocks::new();
    mocks
        .login
        .expect_login()
        .withf(move |credentials| credentials.password().expose() == expected)
        .times(1)
        .return_once(|_| Err(Error::invalid_credentials("invalid credentials")));

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "nobody", "password": over_long})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
    assert_eq!(body["message"], "invalid credentials");
}

#[rstest]
#[case::blank("   ".to_owned())]
#[case::over_long("u".repeat(crate::domain::USERNAME_MAX + 1))]
#[actix_web::test]
async fn login_with_impossible_username_is_unauthorised(#[case] username: String) {
    let mut mocks = Mocks::new();
    mocks.login.expect_login().times(0);

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": username, "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
    assert_eq!(body["message"], "invalid credentials");
}

#[rstest]
#[case::no_username(json!({"password": "pw"}), "username")]
#[case::null_password(json!({"username": "ada", "password": null}), "password")]
#[actix_web::test]
async fn login_with_missing_field_is_invalid_request(#[case] payload: Value, #[case] field: &str) {
    let mut mocks = Mocks::new();
    mocks.login.expect_login().times(0);

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::post().uri("/login").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, field, "missing_field");
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let mut mocks = Mocks::new();
    mocks.users.expect_list_users().times(0);
    let app = actix_test::init_service(test_app(mocks, codec())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/users").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn list_users_wraps_records_in_data() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_list_users()
        .times(1)
        .return_once(|| Ok(vec![user(1, "ada", "UK"), user(2, "grace", "US")]));

    let (status, body) = send(mocks, actix_test::TestRequest::get().uri("/users")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["username"].as_str())
        .collect();
    assert_eq!(names, ["ada", "grace"]);
}

#[rstest]
#[case("abc")]
#[case("0")]
#[case("-4")]
#[actix_web::test]
async fn malformed_ids_are_rejected(#[case] raw: &str) {
    let mut mocks = Mocks::new();
    mocks.users.expect_get_user().times(0);

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::get().uri(&format!("/users/{raw}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, "id", "invalid_id");
}

#[actix_web::test]
async fn get_user_maps_not_found() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_get_user()
        .withf(|id| id.as_i64() == 9)
        .times(1)
        .return_once(|_| Err(Error::not_found("user not found")));

    let (status, body) = send(mocks, actix_test::TestRequest::get().uri("/users/9")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn update_ignores_username_in_body() {
    let mut mocks = Mocks::new();
    mocks
        .command
        .expect_update_user()
        .withf(|id, patch| {
            id.as_i64() == 3
                && patch.password().expose() == "new-pw"
                && patch.country().as_str() == "Chile"
        })
        .times(1)
        .return_once(|_, _| Ok(user(3, "ada", "Chile")));

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::put().uri("/users/3").set_json(json!({
            "username": "mallory",
            "password": "new-pw",
            "country": "Chile"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["country"], "Chile");
}

#[actix_web::test]
async fn update_requires_password_and_country() {
    let mut mocks = Mocks::new();
    mocks.command.expect_update_user().times(0);

    let (status, body) = send(
        mocks,
        actix_test::TestRequest::put()
            .uri("/users/3")
            .set_json(json!({"country": "Chile"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, "password", "missing_field");
}

#[actix_web::test]
async fn delete_confirms_in_data() {
    let mut mocks = Mocks::new();
    mocks
        .command
        .expect_delete_user()
        .withf(|id| id.as_i64() == 5)
        .times(1)
        .return_once(|_| Ok(()));

    let (status, body) = send(mocks, actix_test::TestRequest::delete().uri("/users/5")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": "User deleted"}));
}

#[actix_web::test]
async fn countries_are_listed_as_strings() {
    let mut mocks = Mocks::new();
    mocks.users.expect_list_countries().times(1).return_once(|| {
        Ok(vec![
            Country::new("Chile").expect("valid country"),
            Country::new("UK").expect("valid country"),
        ])
    });

    let (status, body) = send(mocks, actix_test::TestRequest::get().uri("/countries")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": ["Chile", "UK"]}));
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_list_users()
        .times(1)
        .return_once(|| Err(Error::internal("user repository error: relation missing")));

    let (status, body) = send(mocks, actix_test::TestRequest::get().uri("/users")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

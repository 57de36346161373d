use crate::common;
use crate::setup_test_db_or_skip;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

use ervo::domain::password::PasswordHashingService;
use ervo::domain::users::{NewUser, UserRepository};
use ervo::infrastructure::password::PasswordService;
use ervo::infrastructure::repositories::users::PostgresUserRepository;

async fn seed_login_user(pool: &sqlx::PgPool, username: &str, password: &str) {
    let repo = PostgresUserRepository::new(pool.clone());
    let hash = PasswordService::new().hash_password(password).unwrap();
    repo.create(NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash,
        employee_id: Some(7),
        roles: vec!["Employee".to_string()],
    })
    .await
    .expect("Failed to seed user");
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
#[serial]
async fn login_and_refresh_rotate_tokens_over_http() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    seed_login_user(&pool, "jdoe", "password123").await;

    let state = common::create_test_app_state(pool.clone());
    let app = ervo::presentation::router::app(state).unwrap();

    // Login.
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "jdoe", "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert!(!access_token.is_empty());
    assert!(!refresh_token.is_empty());
    assert_eq!(body["data"]["token_type"], "Bearer");

    // Refresh rotates.
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh_token);

    // The original refresh token is spent.
    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn bad_credentials_and_disabled_accounts_get_401() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    seed_login_user(&pool, "jdoe", "password123").await;

    let state = common::create_test_app_state(pool.clone());
    let app = ervo::presentation::router::app(state).unwrap();

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "jdoe", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sqlx::query("UPDATE users SET is_active = FALSE WHERE username = $1")
        .bind("jdoe")
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "jdoe", "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn logout_revokes_the_refresh_token_server_side() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    seed_login_user(&pool, "jdoe", "password123").await;

    let state = common::create_test_app_state(pool.clone());
    let app = ervo::presentation::router::app(state).unwrap();

    let (_, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "jdoe", "password": "password123"}),
    )
    .await;
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header("Authorization", format!("Bearer {access_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let repo = PostgresUserRepository::new(pool.clone());
    let user = repo.find_by_username("jdoe").await.unwrap().unwrap();
    assert!(user.refresh_token_hash.is_none());
}

#[tokio::test]
#[serial]
async fn protected_route_rejects_missing_and_garbage_tokens() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let state = common::create_test_app_state(pool);
    let app = ervo::presentation::router::app(state).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

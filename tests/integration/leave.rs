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

use ervo::domain::auth::permissions;
use ervo::domain::users::{NewUser, User, UserRepository};
use ervo::infrastructure::repositories::users::PostgresUserRepository;

async fn seed_user(pool: &sqlx::PgPool, username: &str, employee_id: i64, role: &str) -> User {
    let repo = PostgresUserRepository::new(pool.clone());
    repo.create(NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "unused".to_string(),
        employee_id: Some(employee_id),
        roles: vec![role.to_string()],
    })
    .await
    .expect("Failed to seed user")
}

fn employee_token(user: &User) -> String {
    common::token_for(
        user,
        vec!["Employee".to_string()],
        vec![permissions::LEAVE_APPLY.to_string(), permissions::LEAVE_VIEW.to_string()],
    )
}

fn approver_token(user: &User) -> String {
    common::token_for(
        user,
        vec!["HR".to_string()],
        vec![permissions::LEAVE_APPROVE.to_string(), permissions::LEAVE_VIEW.to_string()],
    )
}

fn admin_token(user: &User) -> String {
    common::token_for(
        user,
        vec!["Admin".to_string()],
        vec![permissions::LEAVE_VOID.to_string(), permissions::LEAVE_VIEW.to_string()],
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"));
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
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
async fn full_leave_lifecycle_over_http() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let employee = seed_user(&pool, "employee7", 7, "Employee").await;
    let approver = seed_user(&pool, "approver3", 3, "HR").await;
    let admin = seed_user(&pool, "admin1", 1, "Admin").await;

    let state = common::create_test_app_state(pool.clone());
    let app = ervo::presentation::router::app(state).unwrap();

    // Employee 7 applies for three days.
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/leave",
        &employee_token(&employee),
        Some(json!({
            "leave_type_id": 1,
            "start_date": "2026-09-07",
            "end_date": "2026-09-09",
            "approver_id": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "under_approval");
    let id = body["data"]["id"].as_i64().unwrap();

    // A non-approver cannot approve.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/leave/{id}/status"),
        &employee_token(&employee),
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Approver 3 approves.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/leave/{id}/status"),
        &approver_token(&approver),
        Some(json!({"status": "approved", "remarks": "enjoy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    // The balance ledger consumed three days for employee 7.
    let used: f64 = sqlx::query_scalar(
        "SELECT used_days FROM leave_balances WHERE employee_id = 7 AND leave_type_id = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(used, 3.0);

    // Approving again hits the terminal state.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/leave/{id}/status"),
        &approver_token(&approver),
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Admin voids; days flow back.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/leave/{id}/status"),
        &admin_token(&admin),
        Some(json!({"status": "void", "remarks": "duplicate entry"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let used: f64 = sqlx::query_scalar(
        "SELECT used_days FROM leave_balances WHERE employee_id = 7 AND leave_type_id = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(used, 0.0);

    // The audit trail has exactly the two transitions, in order.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/leave/{id}"),
        &employee_token(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["status"], "approved");
    assert_eq!(history[1]["status"], "void");

    // The employee was notified at each step.
    let notified: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_user_id = $1",
    )
    .bind(employee.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(notified, 2);
}

#[tokio::test]
#[serial]
async fn listing_scopes_plain_employees_to_their_own_rows() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let employee = seed_user(&pool, "employee7", 7, "Employee").await;
    let other = seed_user(&pool, "employee8", 8, "Employee").await;
    let approver = seed_user(&pool, "approver3", 3, "HR").await;

    let state = common::create_test_app_state(pool.clone());
    let app = ervo::presentation::router::app(state).unwrap();

    for (user, token) in [(&employee, employee_token(&employee)), (&other, employee_token(&other))]
    {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/leave",
            &token,
            Some(json!({
                "leave_type_id": 1,
                "start_date": "2026-09-07",
                "end_date": "2026-09-07"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "seeding for {}", user.username);
    }

    // Employee 7 asks for everything but only sees their own application.
    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/leave?employee_id=8",
        &employee_token(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["employee_id"] == 7)
    );

    // The approver sees both.
    let (status, body) = send(&app, "GET", "/api/v1/leave", &approver_token(&approver), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
}

use crate::common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let pool = match common::setup_test_db().await {
        Ok(p) => p,
        Err(_) => {
            eprintln!("Skipping health_endpoint_reports_healthy: database not available");
            return;
        }
    };

    let state = common::create_test_app_state(pool);
    let app = ervo::presentation::router::app(state).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

use axum::{Router, routing::post};

use crate::infrastructure::state::AppState;
use crate::presentation::handlers::auth;

/// Authentication endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
}

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::state::AppState;
use crate::presentation::handlers::users;

/// User provisioning endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/me", get(users::me))
}

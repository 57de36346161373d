use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::state::AppState;
use crate::presentation::handlers::leave;

/// Leave workflow endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(leave::apply).get(leave::list))
        .route("/{id}", get(leave::get))
        .route("/{id}/status", put(leave::change_status))
}

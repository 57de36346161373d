use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::state::AppState;
use crate::presentation::handlers;
use crate::presentation::middleware;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::routes;

pub fn app(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = routes::auth::routes().layer(middleware::rate_limit::rate_limit_layer(
        state.config.rate_limit_auth_per_minute,
    )?);

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/leave", routes::leave::routes())
        .nest("/api/v1/users", routes::users::routes())
        .layer(middleware::cors::cors_layer(&state.config.cors_allowed_origins)?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

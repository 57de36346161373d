use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::auth::login::{LoginRequest, LoginResponse, LoginUseCase};
use crate::application::auth::logout::LogoutUseCase;
use crate::application::auth::refresh::{
    RefreshTokenRequest, RefreshTokenResponse, RefreshTokenUseCase,
};
use crate::domain::auth::AuthService;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::UserRepository;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;

fn user_repo(state: &AppState) -> Arc<dyn UserRepository> {
    Arc::new(PostgresUserRepository::new(state.pool.clone()))
}

/// Login handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or disabled account", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = state.auth_service.clone() as Arc<dyn AuthService>;
    let password_service = Arc::new(PasswordService::new()) as Arc<dyn PasswordHashingService>;

    let use_case = LoginUseCase::new(
        user_repo(&state),
        auth_service,
        password_service,
        state.config.access_token_ttl,
        state.config.refresh_token_ttl,
    );

    let response = use_case.execute(req).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(response))))
}

/// Refresh-token handler.
///
/// Single-use rotation: a refresh token dies the moment it is exchanged.
/// Clients should attempt exactly one silent refresh after a 401 and, if
/// that also fails, discard all token state and re-authenticate — never
/// retry the refresh.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token pair rotated", body = ApiResponse<RefreshTokenResponse>),
        (status = 401, description = "Refresh token unknown, expired, or already used", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = state.auth_service.clone() as Arc<dyn AuthService>;

    let use_case = RefreshTokenUseCase::new(
        user_repo(&state),
        auth_service,
        state.config.access_token_ttl,
        state.config.refresh_token_ttl,
    );

    let response = use_case.execute(req).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(response))))
}

/// Logout handler. Revokes the caller's refresh token server-side.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let use_case = LogoutUseCase::new(user_repo(&state));
    use_case.execute(auth.user_id()?).await?;

    Ok(StatusCode::NO_CONTENT)
}

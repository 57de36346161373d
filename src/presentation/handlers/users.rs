use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::users::create::{CreateUserRequest, CreateUserUseCase};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{User, UserRepository};
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

/// Provision a login (requires `users.manage`).
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing users.manage permission", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = user_repo(&state);
    let actor = auth.actor(&user_repo).await?;

    let password_service = Arc::new(PasswordService::new()) as Arc<dyn PasswordHashingService>;
    let use_case = CreateUserUseCase::new(user_repo, password_service);
    let user = use_case.execute(&actor, req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(user))))
}

/// The authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = user_repo(&state)
        .find_by_id(auth.user_id()?)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("user"))?;

    Ok((StatusCode::OK, Json(ApiResponse::new(user))))
}

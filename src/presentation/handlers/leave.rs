use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::application::leave::apply::{ApplyLeaveRequest, ApplyLeaveUseCase};
use crate::application::leave::get::{GetLeaveUseCase, LeaveApplicationDetail};
use crate::application::leave::list::ListLeaveUseCase;
use crate::application::leave::transition::{TransitionLeaveUseCase, TransitionRequest};
use crate::domain::balance::LeaveBalanceLedger;
use crate::domain::leave::{LeaveApplication, LeaveFilter, LeaveRepository, LeaveStatus};
use crate::domain::notifications::Notifier;
use crate::domain::users::UserRepository;
use crate::infrastructure::repositories::balances::PostgresLeaveBalanceLedger;
use crate::infrastructure::repositories::leave::PostgresLeaveRepository;
use crate::infrastructure::repositories::notifications::PostgresNotifier;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::pagination::PageParams;
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;

fn leave_repo(state: &AppState) -> Arc<dyn LeaveRepository> {
    Arc::new(PostgresLeaveRepository::new(state.pool.clone()))
}

fn user_repo(state: &AppState) -> Arc<dyn UserRepository> {
    Arc::new(PostgresUserRepository::new(state.pool.clone()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaveListQuery {
    /// Filter by employee id (privileged callers only).
    pub employee_id: Option<i64>,
    /// Filter by status.
    pub status: Option<LeaveStatus>,
    /// Page number, starting at 1.
    pub page: Option<i64>,
    /// Items per page, capped at 100.
    pub per_page: Option<i64>,
}

/// Submit a leave application.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = ApplyLeaveRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<LeaveApplication>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "No employee profile", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "leave"
)]
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ApplyLeaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = auth.actor(&user_repo(&state)).await?;

    let use_case = ApplyLeaveUseCase::new(leave_repo(&state));
    let application = use_case.execute(&actor, req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(application))))
}

/// List leave applications.
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated applications", body = ApiResponse<Vec<LeaveApplication>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "leave"
)]
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LeaveListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let actor = auth.actor(&user_repo(&state)).await?;

    let filter = LeaveFilter {
        employee_id: query.employee_id,
        status: query.status,
    };
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    };

    let use_case = ListLeaveUseCase::new(leave_repo(&state));
    let (applications, total) = use_case.execute(&actor, filter, page).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(applications).with_meta(json!({
            "page": page.page(),
            "per_page": page.per_page(),
            "total": total
        }))),
    ))
}

/// Fetch one application with its transition history.
#[utoipa::path(
    get,
    path = "/api/v1/leave/{id}",
    params(("id" = i64, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Application with history", body = ApiResponse<LeaveApplicationDetail>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "leave"
)]
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = auth.actor(&user_repo(&state)).await?;

    let use_case = GetLeaveUseCase::new(leave_repo(&state));
    let detail = use_case.execute(id, &actor).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(detail))))
}

/// Move an application along one edge of the status machine.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/status",
    params(("id" = i64, Path, description = "Leave application id")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<LeaveApplication>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Illegal edge or unauthorized actor", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "leave"
)]
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<TransitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = user_repo(&state);
    let actor = auth.actor(&user_repo).await?;

    let ledger =
        Arc::new(PostgresLeaveBalanceLedger::new(state.pool.clone())) as Arc<dyn LeaveBalanceLedger>;
    let notifier = Arc::new(PostgresNotifier::new(state.pool.clone())) as Arc<dyn Notifier>;

    let use_case = TransitionLeaveUseCase::new(leave_repo(&state), user_repo, ledger, notifier);
    let application = use_case.execute(id, req.status, &actor, req.remarks).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(application))))
}

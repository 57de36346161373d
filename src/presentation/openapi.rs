use utoipa::OpenApi;

use crate::application::auth::login::LoginRequest;
use crate::application::auth::refresh::RefreshTokenRequest;
use crate::application::auth::token_utils::TokenResponse;
use crate::application::leave::apply::ApplyLeaveRequest;
use crate::application::leave::get::LeaveApplicationDetail;
use crate::application::leave::transition::TransitionRequest;
use crate::application::users::create::CreateUserRequest;
use crate::domain::leave::{LeaveApplication, LeaveApplicationHistory, LeaveStatus};
use crate::domain::users::User;
use crate::shared::error::{ApiError, ErrorResponse};
use crate::shared::response::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ervo ERP API",
        version = "0.1.0",
        description = "Leave approval workflow and token-based sessions for the Ervo ERP backend."
    ),
    paths(
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::leave::apply,
        crate::presentation::handlers::leave::list,
        crate::presentation::handlers::leave::get,
        crate::presentation::handlers::leave::change_status,
        crate::presentation::handlers::users::create_user,
        crate::presentation::handlers::users::me,
    ),
    components(
        schemas(
            // Request DTOs
            LoginRequest,
            RefreshTokenRequest,
            ApplyLeaveRequest,
            TransitionRequest,
            CreateUserRequest,

            // Domain / response shapes
            LeaveStatus,
            LeaveApplication,
            LeaveApplicationHistory,
            LeaveApplicationDetail,
            TokenResponse,
            User,
            ApiResponse<TokenResponse>,
            ApiResponse<LeaveApplication>,
            ApiResponse<Vec<LeaveApplication>>,
            ApiResponse<LeaveApplicationDetail>,
            ApiResponse<User>,

            // Errors
            ErrorResponse,
            ApiError,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "leave", description = "Leave application workflow endpoints"),
        (name = "users", description = "User provisioning endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

//! Session lifecycle: login issues a pair, refresh rotates it exactly
//! once, logout drops the session back to anonymous.

use crate::common;
use std::sync::Arc;

use ervo::application::auth::login::{LoginRequest, LoginUseCase};
use ervo::application::auth::logout::LogoutUseCase;
use ervo::application::auth::refresh::{RefreshTokenRequest, RefreshTokenUseCase};
use ervo::domain::auth::AuthService;
use ervo::domain::password::PasswordHashingService;
use ervo::domain::users::{NewUser, UserRepository};
use ervo::infrastructure::password::PasswordService;
use ervo::infrastructure::repositories::mock::MockUserRepository;
use ervo::shared::error::AppError;

struct Session {
    repo: MockUserRepository,
    login: LoginUseCase,
    refresh: RefreshTokenUseCase,
    logout: LogoutUseCase,
}

fn session() -> Session {
    let repo = MockUserRepository::default();
    let auth_service = common::create_test_auth_service() as Arc<dyn AuthService>;
    let password_service = Arc::new(PasswordService::new());

    Session {
        login: LoginUseCase::new(
            Arc::new(repo.clone()),
            auth_service.clone(),
            password_service,
            1800,
            604_800,
        ),
        refresh: RefreshTokenUseCase::new(Arc::new(repo.clone()), auth_service, 1800, 604_800),
        logout: LogoutUseCase::new(Arc::new(repo.clone())),
        repo,
    }
}

async fn seed_user(repo: &MockUserRepository) -> uuid::Uuid {
    let hash = PasswordService::new().hash_password("password123").unwrap();
    repo.create(NewUser {
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password_hash: hash,
        employee_id: Some(7),
        roles: vec!["Employee".to_string()],
    })
    .await
    .unwrap()
    .id
}

fn login_request() -> LoginRequest {
    LoginRequest {
        username: "jdoe".to_string(),
        password: "password123".to_string(),
    }
}

/// Anonymous -> Authenticated -> Authenticated (rotated) -> the original
/// token is dead.
#[tokio::test]
async fn login_then_refresh_rotates_the_refresh_token() {
    let s = session();
    seed_user(&s.repo).await;

    let pair = s.login.execute(login_request()).await.unwrap();
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let rotated = s
        .refresh
        .execute(RefreshTokenRequest {
            refresh_token: pair.refresh_token.clone(),
        })
        .await
        .unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert_ne!(rotated.access_token, pair.access_token);

    // The exchanged token was single-use.
    let replay = s
        .refresh
        .execute(RefreshTokenRequest {
            refresh_token: pair.refresh_token,
        })
        .await;
    assert!(matches!(replay, Err(AppError::InvalidToken(_))));

    // The rotated one still works.
    assert!(
        s.refresh
            .execute(RefreshTokenRequest {
                refresh_token: rotated.refresh_token,
            })
            .await
            .is_ok()
    );
}

/// A second login displaces the first session's refresh token entirely.
#[tokio::test]
async fn second_login_invalidates_the_first_sessions_refresh_token() {
    let s = session();
    seed_user(&s.repo).await;

    let first = s.login.execute(login_request()).await.unwrap();
    let _second = s.login.execute(login_request()).await.unwrap();

    let stale = s
        .refresh
        .execute(RefreshTokenRequest {
            refresh_token: first.refresh_token,
        })
        .await;
    assert!(matches!(stale, Err(AppError::InvalidToken(_))));
}

#[tokio::test]
async fn logout_drops_the_session_to_anonymous() {
    let s = session();
    let user_id = seed_user(&s.repo).await;

    let pair = s.login.execute(login_request()).await.unwrap();
    s.logout.execute(user_id).await.unwrap();

    let after_logout = s
        .refresh
        .execute(RefreshTokenRequest {
            refresh_token: pair.refresh_token,
        })
        .await;
    assert!(matches!(after_logout, Err(AppError::InvalidToken(_))));
}

/// The issued access token verifies against the signing service and
/// carries the contracted claim set.
#[tokio::test]
async fn access_token_claims_match_the_contract() {
    let s = session();
    let user_id = seed_user(&s.repo).await;

    let pair = s.login.execute(login_request()).await.unwrap();

    let claims = common::create_test_auth_service()
        .validate_token(&pair.access_token)
        .unwrap();

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.user_id, user_id.to_string());
    assert_eq!(claims.name, "jdoe");
    assert_eq!(claims.email, "jdoe@example.com");
    assert_eq!(claims.role, vec!["Employee"]);
    assert_eq!(claims.exp - claims.iat, 1800);
}

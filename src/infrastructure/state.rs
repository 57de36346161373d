use std::sync::Arc;

use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub auth_service: Arc<JwtAuthService>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let auth_service = Arc::new(JwtAuthService::new(
            &config.jwt_secret,
            config.access_token_ttl,
        ));
        Self {
            pool,
            config,
            auth_service,
        }
    }
}

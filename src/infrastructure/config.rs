use anyhow::Context;
use std::env;
use std::str::FromStr;

/// Environment-driven configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Access-token lifetime in seconds (default 30 minutes).
    pub access_token_ttl: i64,
    /// Refresh-token lifetime in seconds (default 7 days).
    pub refresh_token_ttl: i64,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub rate_limit_auth_per_minute: u64,
    /// Comma-separated list of allowed origins; empty or "*" allows any.
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server_addr: env_or("SERVER_ADDR", "0.0.0.0:3000".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", 1800),
            refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", 604_800),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            db_acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 3),
            rate_limit_auth_per_minute: env_or("RATE_LIMIT_AUTH_PER_MINUTE", 60),
            cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", String::new()),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

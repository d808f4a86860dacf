//! Process-scoped configuration.
//!
//! Read from the environment exactly once in `main` and injected from there
//! — nothing below this layer looks at environment variables.

use chrono::Duration;

use salespoint_auth::token::DEFAULT_VALIDITY_DAYS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// HS256 signing secret. Loaded at startup, never rotated at runtime.
    pub jwt_secret: String,
    pub token_validity: Duration,
    /// When set (and the `postgres` feature is enabled), credentials persist
    /// to Postgres; otherwise the in-memory stores are used.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let validity_days = std::env::var("TOKEN_VALIDITY_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_VALIDITY_DAYS);

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret,
            token_validity: Duration::days(validity_days),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}

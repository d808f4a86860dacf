//! Service wiring: credential stores + token machinery behind one struct.
//!
//! In-memory stores are the default; with the `postgres` feature and a
//! `DATABASE_URL`, credentials persist to Postgres instead. Handlers only
//! ever see the trait objects.

use std::sync::Arc;

use salespoint_auth::store::CredentialStore;
use salespoint_auth::{Admin, Client, Employee, TokenIssuer, TokenVerifier, User};
use salespoint_store::MemoryCredentialStore;

use crate::config::AppConfig;

pub type DynStore<R> = Arc<dyn CredentialStore<Record = R>>;

pub struct AppServices {
    pub users: DynStore<User>,
    pub clients: DynStore<Client>,
    pub employees: DynStore<Employee>,
    pub admins: DynStore<Admin>,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory(config: &AppConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            users: Arc::new(MemoryCredentialStore::new()),
            clients: Arc::new(MemoryCredentialStore::new()),
            employees: Arc::new(MemoryCredentialStore::new()),
            admins: Arc::new(MemoryCredentialStore::new()),
            issuer: TokenIssuer::new(secret, config.token_validity),
            verifier: TokenVerifier::new(secret),
        }
    }

    /// Postgres-backed wiring. The pool is shared; each store partitions the
    /// credentials table by principal kind.
    #[cfg(feature = "postgres")]
    pub fn postgres(config: &AppConfig, pool: sqlx::PgPool) -> Self {
        use salespoint_store::PgCredentialStore;

        let secret = config.jwt_secret.as_bytes();
        Self {
            users: Arc::new(PgCredentialStore::new(pool.clone())),
            clients: Arc::new(PgCredentialStore::new(pool.clone())),
            employees: Arc::new(PgCredentialStore::new(pool.clone())),
            admins: Arc::new(PgCredentialStore::new(pool)),
            issuer: TokenIssuer::new(secret, config.token_validity),
            verifier: TokenVerifier::new(secret),
        }
    }
}

/// Build services from configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if let Some(url) = &config.database_url {
        #[cfg(feature = "postgres")]
        {
            let pool = sqlx::PgPool::connect(url).await?;
            salespoint_store::postgres::migrate(&pool).await?;
            tracing::info!("credential stores backed by postgres");
            return Ok(AppServices::postgres(config, pool));
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = url;
            tracing::warn!(
                "DATABASE_URL set but the postgres feature is not enabled; using in-memory stores"
            );
        }
    }

    Ok(AppServices::in_memory(config))
}

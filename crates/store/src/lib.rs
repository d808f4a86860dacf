//! `salespoint-store` — credential-store implementations.
//!
//! Two backends behind the `CredentialStore` trait from `salespoint-auth`:
//! an in-memory store (default; dev and tests) and a Postgres-backed
//! document store behind the `postgres` feature.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryCredentialStore;

#[cfg(feature = "postgres")]
pub use postgres::PgCredentialStore;

use chrono::{DateTime, Datelike, Utc};

use salespoint_auth::principal::format_staff_code;
use salespoint_auth::store::{CredentialStore, StoreError};

/// Allocate the next staff code ("EMP240001" style) for the year of `now`.
pub async fn allocate_staff_code<S>(
    store: &S,
    prefix: &str,
    now: DateTime<Utc>,
) -> Result<String, StoreError>
where
    S: CredentialStore + ?Sized,
{
    let year = now.year();
    let sequence = store.next_staff_sequence(prefix, year).await?;
    Ok(format_staff_code(prefix, year, sequence))
}

//! Credential-store interface.
//!
//! The login flow and the API layer are written against this trait; the
//! `salespoint-store` crate provides the in-memory and Postgres-backed
//! implementations. Implementations must apply `record_failure` /
//! `record_success` atomically per principal — concurrent login attempts for
//! the same account must not lose counter updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use salespoint_core::EmailAddress;

use crate::principal::Credential;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The email is already registered within this principal type.
    #[error("email already registered")]
    DuplicateEmail,

    /// The staff code ("EMP…"/"ADM…") is already taken.
    #[error("staff code already exists")]
    DuplicateStaffCode,

    #[error("record not found")]
    NotFound,

    /// Backend failure (connection, serialization). Fatal for the request.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Per-principal-type credential storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    type Record: Credential;

    /// Insert a new record; fails on duplicate email or staff code.
    async fn insert(&self, record: Self::Record) -> Result<(), StoreError>;

    /// Look up by normalized email.
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<Self::Record>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Self::Record>, StoreError>;

    /// Replace an existing record.
    async fn update(&self, record: Self::Record) -> Result<(), StoreError>;

    /// Hard-delete a record. Guards (self-delete, super_admin) live in the
    /// routes, not here.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Apply the lockout policy's failure transition atomically:
    /// increment-and-maybe-lock in one step.
    async fn record_failure(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Apply the success transition atomically: clear the counter and any
    /// lock, stamp `last_login`. Returns the updated record.
    async fn record_success(&self, id: Uuid, now: DateTime<Utc>)
    -> Result<Self::Record, StoreError>;

    /// Next free sequence number for year-scoped staff codes
    /// (`<prefix><yy>0001` onward).
    async fn next_staff_sequence(&self, prefix: &str, year: i32) -> Result<u32, StoreError>;
}

//! Postgres-backed credential store.
//!
//! Records are persisted as JSONB documents in a single `credentials` table,
//! namespaced by principal kind, with the lookup columns (email, staff code)
//! lifted out for uniqueness constraints and indexed access.
//!
//! ## Atomicity
//!
//! The lockout bookkeeping (`record_failure` / `record_success`) runs inside
//! a transaction with `SELECT … FOR UPDATE`, so concurrent login attempts
//! for the same principal serialize on the row and no counter update is
//! lost.
//!
//! ## Error mapping
//!
//! Unique violations (code 23505) map to `DuplicateEmail` /
//! `DuplicateStaffCode` by constraint name; everything else surfaces as
//! `Backend` and is fatal for the request.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use salespoint_auth::Credential;
use salespoint_auth::store::{CredentialStore, StoreError};
use salespoint_core::EmailAddress;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS credentials (
    kind        TEXT NOT NULL,
    id          UUID NOT NULL,
    email       TEXT NOT NULL,
    staff_code  TEXT,
    doc         JSONB NOT NULL,
    PRIMARY KEY (kind, id),
    CONSTRAINT credentials_email_unique UNIQUE (kind, email),
    CONSTRAINT credentials_staff_code_unique UNIQUE (kind, staff_code)
)
"#;

/// Apply the credentials schema. Idempotent; called once at startup.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}

/// One store instance per principal type; all share the `credentials` table,
/// partitioned by the `kind` column.
#[derive(Debug, Clone)]
pub struct PgCredentialStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgCredentialStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.code().as_deref() == Some("23505")
    {
        return match db.constraint() {
            Some(name) if name.contains("staff_code") => StoreError::DuplicateStaffCode,
            _ => StoreError::DuplicateEmail,
        };
    }
    StoreError::Backend(e.to_string())
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn decode<R: DeserializeOwned>(doc: serde_json::Value) -> Result<R, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Backend(format!("corrupt document: {e}")))
}

#[async_trait]
impl<R> CredentialStore for PgCredentialStore<R>
where
    R: Credential + Serialize + DeserializeOwned,
{
    type Record = R;

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let doc = serde_json::to_value(&record)
            .map_err(|e| StoreError::Backend(format!("encode: {e}")))?;

        sqlx::query(
            "INSERT INTO credentials (kind, id, email, staff_code, doc) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(R::kind())
        .bind(record.id())
        .bind(record.email().as_str())
        .bind(record.staff_code())
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT doc FROM credentials WHERE kind = $1 AND email = $2")
            .bind(R::kind())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|r| decode(r.get::<serde_json::Value, _>("doc")))
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT doc FROM credentials WHERE kind = $1 AND id = $2")
            .bind(R::kind())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|r| decode(r.get::<serde_json::Value, _>("doc")))
            .transpose()
    }

    async fn update(&self, record: R) -> Result<(), StoreError> {
        let doc = serde_json::to_value(&record)
            .map_err(|e| StoreError::Backend(format!("encode: {e}")))?;

        let result = sqlx::query(
            "UPDATE credentials SET email = $3, staff_code = $4, doc = $5 \
             WHERE kind = $1 AND id = $2",
        )
        .bind(R::kind())
        .bind(record.id())
        .bind(record.email().as_str())
        .bind(record.staff_code())
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM credentials WHERE kind = $1 AND id = $2")
            .bind(R::kind())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn record_failure(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_locked_row(id, |record: &mut R| {
            let next = record.account().lockout().after_failure(now);
            record.account_mut().apply_lockout(next);
            record.account_mut().touch(now);
        })
        .await?;
        Ok(())
    }

    async fn record_success(&self, id: Uuid, now: DateTime<Utc>) -> Result<R, StoreError> {
        self.with_locked_row(id, |record: &mut R| {
            let next = record.account().lockout().after_success();
            record.account_mut().apply_lockout(next);
            record.account_mut().last_login = Some(now);
            record.account_mut().touch(now);
        })
        .await
    }

    async fn next_staff_sequence(&self, prefix: &str, year: i32) -> Result<u32, StoreError> {
        let pattern = format!("{prefix}{:02}%", year.rem_euclid(100));
        let prefix_len = prefix.len() + 2;

        let row = sqlx::query(
            "SELECT staff_code FROM credentials \
             WHERE kind = $1 AND staff_code LIKE $2 \
             ORDER BY staff_code DESC LIMIT 1",
        )
        .bind(R::kind())
        .bind(&pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let next = row
            .and_then(|r| {
                let code: String = r.get("staff_code");
                code.get(prefix_len..)?.parse::<u32>().ok()
            })
            .map_or(1, |n| n + 1);

        Ok(next)
    }
}

impl<R> PgCredentialStore<R>
where
    R: Credential + Serialize + DeserializeOwned,
{
    /// Load the row under `FOR UPDATE`, apply `mutate`, write it back, and
    /// commit — one serialized read-modify-write per principal.
    async fn with_locked_row<F>(&self, id: Uuid, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut R),
    {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query("SELECT doc FROM credentials WHERE kind = $1 AND id = $2 FOR UPDATE")
            .bind(R::kind())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)?;

        let mut record: R = decode(row.get::<serde_json::Value, _>("doc"))?;
        mutate(&mut record);

        let doc = serde_json::to_value(&record)
            .map_err(|e| StoreError::Backend(format!("encode: {e}")))?;

        sqlx::query("UPDATE credentials SET doc = $3 WHERE kind = $1 AND id = $2")
            .bind(R::kind())
            .bind(id)
            .bind(doc)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(record)
    }
}

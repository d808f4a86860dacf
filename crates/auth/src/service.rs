//! The login flow, written once for all four principal types.
//!
//! Check order (first failure wins): unknown email → locked → deactivated →
//! role-specific gate (client subscription, admin password expiry) →
//! password. Only a wrong password counts toward the lockout policy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use salespoint_core::EmailAddress;

use crate::password::{self, PasswordError};
use crate::principal::Credential;
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account is inside a lock window.
    #[error("account is temporarily locked due to multiple failed login attempts")]
    Locked,

    /// Account was soft-disabled.
    #[error("account is deactivated")]
    Inactive,

    /// Client-only: subscription lapsed. Distinct from an auth failure —
    /// surfaces as 402 at the boundary.
    #[error("subscription is not active")]
    SubscriptionInactive,

    /// Admin-only: password aged out.
    #[error("password has expired")]
    PasswordExpired,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Authenticate against a credential store.
pub async fn login<S>(
    store: &S,
    email: &EmailAddress,
    password: &str,
    now: DateTime<Utc>,
) -> Result<S::Record, LoginError>
where
    S: CredentialStore + ?Sized,
{
    login_filtered(store, email, password, now, |_| true).await
}

/// Authenticate, additionally requiring `filter` to accept the record.
///
/// A record the filter rejects behaves exactly like an unknown email: no
/// lockout bookkeeping is touched. The vendor login uses this to restrict
/// the user store to vendor-role accounts.
pub async fn login_filtered<S, F>(
    store: &S,
    email: &EmailAddress,
    password: &str,
    now: DateTime<Utc>,
    filter: F,
) -> Result<S::Record, LoginError>
where
    S: CredentialStore + ?Sized,
    F: FnOnce(&S::Record) -> bool,
{
    let record = store
        .find_by_email(email)
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    if !filter(&record) {
        return Err(LoginError::InvalidCredentials);
    }

    if record.account().is_locked(now) {
        return Err(LoginError::Locked);
    }

    if !record.is_active() {
        return Err(LoginError::Inactive);
    }

    record.pre_login_check(now)?;

    let digest = record.account().password_hash.clone();
    if !verify_blocking(password.to_string(), digest).await? {
        store.record_failure(record.id(), now).await?;
        tracing::debug!(kind = S::Record::kind(), "failed login attempt");
        return Err(LoginError::InvalidCredentials);
    }

    let record = store.record_success(record.id(), now).await?;
    Ok(record)
}

/// Verify a password off the async runtime.
///
/// The hash is intentionally slow (hundreds of milliseconds); running it on
/// the blocking pool keeps one login from stalling concurrent traffic.
pub async fn verify_blocking(password: String, digest: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || password::verify(&password, &digest))
        .await
        .map_err(|e| PasswordError::Verify(format!("verification task failed: {e}")))?
}

/// Hash a password off the async runtime.
pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|e| PasswordError::Hash(format!("hashing task failed: {e}")))?
}

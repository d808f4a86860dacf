//! In-memory credential store (dev/test wiring).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use salespoint_auth::Credential;
use salespoint_auth::store::{CredentialStore, StoreError};
use salespoint_core::EmailAddress;

/// Mutex-guarded map keyed by id, one instance per principal type.
///
/// All mutations happen under a single guard, so the lockout bookkeeping is
/// applied without lost updates even under concurrent logins.
#[derive(Debug)]
pub struct MemoryCredentialStore<R> {
    records: Mutex<HashMap<Uuid, R>>,
}

impl<R: Credential> MemoryCredentialStore<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R: Credential> CredentialStore for MemoryCredentialStore<R> {
    type Record = R;

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();

        if records.values().any(|r| r.email() == record.email()) {
            return Err(StoreError::DuplicateEmail);
        }
        if let Some(code) = record.staff_code()
            && records.values().any(|r| r.staff_code() == Some(code))
        {
            return Err(StoreError::DuplicateStaffCode);
        }

        records.insert(record.id(), record);
        Ok(())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<R>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, record: R) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&record.id()) {
            return Err(StoreError::NotFound);
        }
        records.insert(record.id(), record);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn record_failure(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;

        let next = record.account().lockout().after_failure(now);
        record.account_mut().apply_lockout(next);
        record.account_mut().touch(now);
        Ok(())
    }

    async fn record_success(&self, id: Uuid, now: DateTime<Utc>) -> Result<R, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;

        let next = record.account().lockout().after_success();
        record.account_mut().apply_lockout(next);
        record.account_mut().last_login = Some(now);
        record.account_mut().touch(now);
        Ok(record.clone())
    }

    async fn next_staff_sequence(&self, prefix: &str, year: i32) -> Result<u32, StoreError> {
        let records = self.records.lock().unwrap();
        let year_prefix = format!("{prefix}{:02}", year.rem_euclid(100));

        let highest = records
            .values()
            .filter_map(|r| r.staff_code())
            .filter_map(|code| code.strip_prefix(year_prefix.as_str()))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max();

        Ok(highest.map_or(1, |n| n + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use salespoint_auth::lockout::MAX_FAILED_ATTEMPTS;
    use salespoint_auth::roles::EmployeeRole;
    use salespoint_auth::{Employee, User, UserRole};

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).unwrap()
    }

    fn user(raw_email: &str) -> User {
        User::new(
            email(raw_email),
            "digest".into(),
            "T".into(),
            "U".into(),
            UserRole::User,
            Utc::now(),
        )
    }

    fn employee(raw_email: &str, staff_code: &str) -> Employee {
        Employee::new(
            email(raw_email),
            "digest".into(),
            "T".into(),
            "U".into(),
            staff_code.into(),
            "Sales".into(),
            "Clerk".into(),
            EmployeeRole::Employee,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryCredentialStore::new();
        store.insert(user("a@x.com")).await.unwrap();

        let err = store.insert(user("a@x.com")).await;
        assert!(matches!(err, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn duplicate_staff_code_is_a_conflict() {
        let store = MemoryCredentialStore::new();
        store.insert(employee("a@x.com", "EMP240001")).await.unwrap();

        let err = store.insert(employee("b@x.com", "EMP240001")).await;
        assert!(matches!(err, Err(StoreError::DuplicateStaffCode)));
    }

    #[tokio::test]
    async fn failure_bookkeeping_locks_at_the_threshold() {
        let store = MemoryCredentialStore::new();
        let record = user("a@x.com");
        let id = Credential::id(&record);
        store.insert(record).await.unwrap();

        let now = Utc::now();
        for _ in 0..MAX_FAILED_ATTEMPTS {
            store.record_failure(id, now).await.unwrap();
        }

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert!(record.account.is_locked(now));

        let record = store.record_success(id, now).await.unwrap();
        assert!(!record.account.is_locked(now));
        assert_eq!(record.account.failed_attempts, 0);
        assert_eq!(record.account.last_login, Some(now));
    }

    #[tokio::test]
    async fn staff_sequence_is_scoped_to_the_year() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.next_staff_sequence("EMP", 2024).await.unwrap(), 1);

        store.insert(employee("a@x.com", "EMP240001")).await.unwrap();
        store.insert(employee("b@x.com", "EMP240007")).await.unwrap();
        store.insert(employee("c@x.com", "EMP230004")).await.unwrap();

        assert_eq!(store.next_staff_sequence("EMP", 2024).await.unwrap(), 8);
        assert_eq!(store.next_staff_sequence("EMP", 2025).await.unwrap(), 1);
    }
}

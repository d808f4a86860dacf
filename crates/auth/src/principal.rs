//! Principal records: the four account variants and their shared state.
//!
//! # Invariants
//! - Emails are unique within each principal type's own namespace.
//! - `is_locked` is derived from `lock_until`, never stored.
//! - A password digest is set exactly once per password value change.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salespoint_core::{AdminId, ClientId, EmailAddress, EmployeeId, Entity, UserId};

use crate::lockout::LockoutStatus;
use crate::permissions::{Module, Permission};
use crate::roles::{
    AccessLevel, AdminLevel, EmployeeRole, SubscriptionFeature, SubscriptionPlan,
    SubscriptionStatus, TokenRole, UserRole,
};
use crate::service::LoginError;

// ─────────────────────────────────────────────────────────────────────────────
// Shared account state
// ─────────────────────────────────────────────────────────────────────────────

/// Credential bookkeeping common to every principal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// PHC-formatted digest. Stripped from every API response by the DTO layer.
    pub password_hash: String,
    pub is_active: bool,
    pub failed_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountState {
    pub fn new(password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            password_hash,
            is_active: true,
            failed_attempts: 0,
            lock_until: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn lockout(&self) -> LockoutStatus {
        LockoutStatus {
            failed_attempts: self.failed_attempts,
            lock_until: self.lock_until,
        }
    }

    pub fn apply_lockout(&mut self, status: LockoutStatus) {
        self.failed_attempts = status.failed_attempts;
        self.lock_until = status.lock_until;
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lockout().is_locked(now)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Staff codes
// ─────────────────────────────────────────────────────────────────────────────

/// Prefix for generated employee codes ("EMP24001" style: prefix + 2-digit
/// year + 4-digit sequence).
pub const EMPLOYEE_CODE_PREFIX: &str = "EMP";

/// Prefix for generated admin codes.
pub const ADMIN_CODE_PREFIX: &str = "ADM";

/// Format a year-scoped staff code: `<prefix><yy><seq:04>`.
pub fn format_staff_code(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{prefix}{:02}{sequence:04}", year.rem_euclid(100))
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// End-user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub account: AccountState,
}

impl User {
    pub fn new(
        email: EmailAddress,
        password_hash: String,
        first_name: String,
        last_name: String,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            first_name,
            last_name,
            phone: None,
            role,
            account: AccountState::new(password_hash, now),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Contact person for a client (tenant) account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
}

/// Client subscription state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub features: Vec<SubscriptionFeature>,
}

impl Subscription {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            plan: SubscriptionPlan::default(),
            status: SubscriptionStatus::default(),
            start_date: now,
            end_date: None,
            features: vec![SubscriptionFeature::BasicFeatures],
        }
    }

    /// Active iff status is `active` and the end date (when set) is in the
    /// future.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.end_date.is_none_or(|end| end > now)
    }
}

/// Client (tenant) account. Owns the business records the CRUD collaborators
/// scope their queries by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub email: EmailAddress,
    pub company_name: String,
    pub contact: ContactPerson,
    pub subscription: Subscription,
    pub account: AccountState,
}

impl Client {
    pub fn new(
        email: EmailAddress,
        password_hash: String,
        company_name: String,
        contact: ContactPerson,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ClientId::new(),
            email,
            company_name,
            contact,
            subscription: Subscription::new(now),
            account: AccountState::new(password_hash, now),
        }
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Employee account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Business identifier ("EMP24001"), unique across employees.
    pub staff_code: String,
    pub department: String,
    pub position: String,
    pub hire_date: DateTime<Utc>,
    pub role: EmployeeRole,
    pub permissions: Vec<Permission>,
    pub account: AccountState,
}

impl Employee {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        email: EmailAddress,
        password_hash: String,
        first_name: String,
        last_name: String,
        staff_code: String,
        department: String,
        position: String,
        role: EmployeeRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EmployeeId::new(),
            email,
            first_name,
            last_name,
            phone: None,
            staff_code,
            department,
            position,
            hire_date: now,
            role,
            permissions: role.default_permissions().to_vec(),
            account: AccountState::new(password_hash, now),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Business identifier ("ADM24001"), unique across admins.
    pub staff_code: String,
    pub department: String,
    pub position: String,
    pub hire_date: DateTime<Utc>,
    pub admin_level: AdminLevel,
    pub access_level: AccessLevel,
    pub permissions: Vec<Permission>,
    pub allowed_modules: Vec<Module>,
    pub session_timeout_minutes: u32,
    /// TOTP secret, if two-factor is enrolled. Never serialized to API
    /// responses.
    pub two_factor_secret: Option<String>,
    pub last_password_change: DateTime<Utc>,
    pub password_expiry_days: u32,
    pub account: AccountState,
}

impl Admin {
    pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u32 = 30;
    pub const DEFAULT_PASSWORD_EXPIRY_DAYS: u32 = 90;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        email: EmailAddress,
        password_hash: String,
        first_name: String,
        last_name: String,
        staff_code: String,
        department: String,
        position: String,
        admin_level: AdminLevel,
        access_level: AccessLevel,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AdminId::new(),
            email,
            first_name,
            last_name,
            phone: None,
            staff_code,
            department,
            position,
            hire_date: now,
            admin_level,
            access_level,
            permissions: admin_level.default_permissions().to_vec(),
            allowed_modules: access_level.default_modules().to_vec(),
            session_timeout_minutes: Self::DEFAULT_SESSION_TIMEOUT_MINUTES,
            two_factor_secret: None,
            last_password_change: now,
            password_expiry_days: Self::DEFAULT_PASSWORD_EXPIRY_DAYS,
            account: AccountState::new(password_hash, now),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn can_access_module(&self, module: Module) -> bool {
        self.allowed_modules.contains(&module)
    }

    pub fn is_super_admin(&self) -> bool {
        self.admin_level == AdminLevel::SuperAdmin
    }

    /// Derived: the password lapsed `password_expiry_days` after its last
    /// change. Admin accounts only — the asymmetry is deliberate.
    pub fn is_password_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.last_password_change + Duration::days(i64::from(self.password_expiry_days))
    }

    /// Record a password change: new digest, expiry clock restarted.
    pub fn set_password_hash(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.account.password_hash = password_hash;
        self.last_password_change = now;
        self.account.touch(now);
    }
}

impl Entity for Admin {
    type Id = AdminId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Credential capability
// ─────────────────────────────────────────────────────────────────────────────

/// The capability set shared by all four principal types: authenticate,
/// lock/unlock, hash-check. The login flow and the credential stores are
/// written once against this trait.
pub trait Credential: Clone + Send + Sync + 'static {
    /// Storage namespace for this principal type ("user", "client", ...).
    fn kind() -> &'static str;

    fn id(&self) -> Uuid;

    fn email(&self) -> &EmailAddress;

    fn account(&self) -> &AccountState;

    fn account_mut(&mut self) -> &mut AccountState;

    /// Role this record authenticates as.
    fn token_role(&self) -> TokenRole;

    /// Business code ("EMP…"/"ADM…") if this principal type carries one.
    fn staff_code(&self) -> Option<&str> {
        None
    }

    fn is_active(&self) -> bool {
        self.account().is_active
    }

    /// Role-specific check run after the lock/active checks and before the
    /// password is verified. Failures here never count as failed attempts.
    fn pre_login_check(&self, _now: DateTime<Utc>) -> Result<(), LoginError> {
        Ok(())
    }
}

impl Credential for User {
    fn kind() -> &'static str {
        "user"
    }

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn email(&self) -> &EmailAddress {
        &self.email
    }

    fn account(&self) -> &AccountState {
        &self.account
    }

    fn account_mut(&mut self) -> &mut AccountState {
        &mut self.account
    }

    fn token_role(&self) -> TokenRole {
        self.role.token_role()
    }
}

impl Credential for Client {
    fn kind() -> &'static str {
        "client"
    }

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn email(&self) -> &EmailAddress {
        &self.email
    }

    fn account(&self) -> &AccountState {
        &self.account
    }

    fn account_mut(&mut self) -> &mut AccountState {
        &mut self.account
    }

    fn token_role(&self) -> TokenRole {
        TokenRole::Client
    }

    fn pre_login_check(&self, now: DateTime<Utc>) -> Result<(), LoginError> {
        if !self.subscription.is_active(now) {
            return Err(LoginError::SubscriptionInactive);
        }
        Ok(())
    }
}

impl Credential for Employee {
    fn kind() -> &'static str {
        "employee"
    }

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn email(&self) -> &EmailAddress {
        &self.email
    }

    fn account(&self) -> &AccountState {
        &self.account
    }

    fn account_mut(&mut self) -> &mut AccountState {
        &mut self.account
    }

    fn token_role(&self) -> TokenRole {
        TokenRole::Employee
    }

    fn staff_code(&self) -> Option<&str> {
        Some(&self.staff_code)
    }
}

impl Credential for Admin {
    fn kind() -> &'static str {
        "admin"
    }

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn email(&self) -> &EmailAddress {
        &self.email
    }

    fn account(&self) -> &AccountState {
        &self.account
    }

    fn account_mut(&mut self) -> &mut AccountState {
        &mut self.account
    }

    fn token_role(&self) -> TokenRole {
        TokenRole::Admin
    }

    fn staff_code(&self) -> Option<&str> {
        Some(&self.staff_code)
    }

    fn pre_login_check(&self, now: DateTime<Utc>) -> Result<(), LoginError> {
        if self.is_password_expired(now) {
            return Err(LoginError::PasswordExpired);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Principal union
// ─────────────────────────────────────────────────────────────────────────────

/// An authenticated identity: one of the four account variants.
///
/// The authentication gate resolves a token into this union; adding a fifth
/// principal type means a new variant and a new arm in the gate's dispatch,
/// nothing at the call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(User),
    Client(Client),
    Employee(Employee),
    Admin(Admin),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::User(u) => Credential::id(u),
            Principal::Client(c) => Credential::id(c),
            Principal::Employee(e) => Credential::id(e),
            Principal::Admin(a) => Credential::id(a),
        }
    }

    pub fn email(&self) -> &EmailAddress {
        match self {
            Principal::User(u) => &u.email,
            Principal::Client(c) => &c.email,
            Principal::Employee(e) => &e.email,
            Principal::Admin(a) => &a.email,
        }
    }

    pub fn token_role(&self) -> TokenRole {
        match self {
            Principal::User(u) => u.token_role(),
            Principal::Client(c) => c.token_role(),
            Principal::Employee(e) => e.token_role(),
            Principal::Admin(a) => a.token_role(),
        }
    }

    pub fn account(&self) -> &AccountState {
        match self {
            Principal::User(u) => &u.account,
            Principal::Client(c) => &c.account,
            Principal::Employee(e) => &e.account,
            Principal::Admin(a) => &a.account,
        }
    }

    /// Permission set, for the principal types that carry one.
    pub fn permissions(&self) -> Option<&[Permission]> {
        match self {
            Principal::User(_) | Principal::Client(_) => None,
            Principal::Employee(e) => Some(&e.permissions),
            Principal::Admin(a) => Some(&a.permissions),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions()
            .is_some_and(|set| set.contains(&permission))
    }
}

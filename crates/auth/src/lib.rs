//! `salespoint-auth` — authentication/authorization core.
//!
//! This crate owns credential verification, the account-lockout policy,
//! token issuance/verification, and the role/permission vocabulary. It is
//! intentionally decoupled from HTTP; the API crate adapts it to transport.

pub mod lockout;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod service;
pub mod store;
pub mod token;

pub use lockout::{LOCK_HOURS, LockoutStatus, MAX_FAILED_ATTEMPTS};
pub use password::PasswordError;
pub use permissions::{Module, Permission};
pub use principal::{
    Admin, AccountState, Client, ContactPerson, Credential, Employee, Principal, Subscription, User,
};
pub use roles::{
    AccessLevel, AdminLevel, EmployeeRole, SubscriptionFeature, SubscriptionPlan,
    SubscriptionStatus, TokenRole, UserRole,
};
pub use service::{LoginError, login, login_filtered};
pub use store::{CredentialStore, StoreError};
pub use token::{TokenClaims, TokenError, TokenIssuer, TokenVerifier};

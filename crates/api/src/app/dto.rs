//! Request/response DTOs, field validation, and JSON mapping.
//!
//! Responses are built here explicitly so credential material (password
//! digests, two-factor secrets) can never leak through a derived serializer.

use serde::Deserialize;
use serde_json::{Value, json};

use salespoint_auth::{
    AccessLevel, Admin, AdminLevel, Client, Employee, EmployeeRole, Permission, Principal, User,
    UserRole,
};
use salespoint_core::EmailAddress;

use crate::app::errors::{ApiError, FieldError};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct ContactPersonRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub contact_person: ContactPersonRequest,
}

#[derive(Debug, Deserialize)]
pub struct RegisterEmployeeRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub employee_id: String,
    pub department: String,
    pub position: String,
    pub role: Option<EmployeeRole>,
    /// Explicit grant; defaults to the role tier's list when absent.
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub admin_id: String,
    pub department: String,
    pub position: String,
    pub admin_level: Option<AdminLevel>,
    pub access_level: Option<AccessLevel>,
}

/// Provisioning variant: no staff id — the server generates it.
#[derive(Debug, Deserialize)]
pub struct ProvisionEmployeeRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub role: Option<EmployeeRole>,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub admin_level: Option<AdminLevel>,
    pub access_level: Option<AccessLevel>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Client accounts only.
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionsRequest {
    pub permissions: Vec<Permission>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Collects per-field failures so a 400 can report all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

const PASSWORD_SPECIALS: &str = "@$!%*?&";

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn email(&mut self, raw: &str) -> Option<EmailAddress> {
        match EmailAddress::parse(raw) {
            Ok(email) => Some(email),
            Err(_) => {
                self.push("email", "Please enter a valid email address");
                None
            }
        }
    }

    /// Minimum 8 characters with at least one lowercase letter, one
    /// uppercase letter, one digit, and one special character.
    pub fn password(&mut self, password: &str) {
        if password.len() < 8 {
            self.push("password", "Password must be at least 8 characters long");
            return;
        }

        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

        if !(has_lower && has_upper && has_digit && has_special) {
            self.push(
                "password",
                "Password must contain at least one uppercase letter, one lowercase letter, \
                 one number, and one special character",
            );
        }
    }

    pub fn required_password(&mut self, password: &str) {
        if password.is_empty() {
            self.push("password", "Password is required");
        }
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.push(
                field,
                format!("{field} must be between {min} and {max} characters"),
            );
        }
    }

    pub fn name(&mut self, field: &str, value: &str) {
        self.length(field, value, 2, 50);
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Validation failed", self.errors))
        }
    }

    /// Finish and hand back a value produced during validation (typically
    /// the parsed email). The value is always present when no field failed.
    pub fn finish_with<T>(self, value: Option<T>) -> Result<T, ApiError> {
        self.finish()?;
        value.ok_or_else(|| ApiError::Internal("validated value missing".into()))
    }
}

pub fn validate_login(body: &LoginRequest) -> Result<EmailAddress, ApiError> {
    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.required_password(&body.password);
    v.finish_with(email)
}

// ─────────────────────────────────────────────────────────────────────────────
// Response mapping (secrets stripped)
// ─────────────────────────────────────────────────────────────────────────────

fn account_json(record: &salespoint_auth::AccountState) -> Value {
    json!({
        "is_active": record.is_active,
        "last_login": record.last_login,
        "created_at": record.created_at,
        "updated_at": record.updated_at,
    })
}

pub fn user_json(user: &User) -> Value {
    let mut value = account_json(&user.account);
    value["id"] = json!(user.id);
    value["email"] = json!(user.email);
    value["first_name"] = json!(user.first_name);
    value["last_name"] = json!(user.last_name);
    value["phone"] = json!(user.phone);
    value["role"] = json!(user.role);
    value
}

pub fn client_json(client: &Client) -> Value {
    let mut value = account_json(&client.account);
    value["id"] = json!(client.id);
    value["email"] = json!(client.email);
    value["company_name"] = json!(client.company_name);
    value["contact_person"] = json!({
        "first_name": client.contact.first_name,
        "last_name": client.contact.last_name,
        "phone": client.contact.phone,
        "position": client.contact.position,
    });
    value["subscription"] = json!(client.subscription);
    value
}

pub fn employee_json(employee: &Employee) -> Value {
    let mut value = account_json(&employee.account);
    value["id"] = json!(employee.id);
    value["email"] = json!(employee.email);
    value["first_name"] = json!(employee.first_name);
    value["last_name"] = json!(employee.last_name);
    value["phone"] = json!(employee.phone);
    value["employee_id"] = json!(employee.staff_code);
    value["department"] = json!(employee.department);
    value["position"] = json!(employee.position);
    value["hire_date"] = json!(employee.hire_date);
    value["role"] = json!(employee.role);
    value["permissions"] = json!(employee.permissions);
    value
}

pub fn admin_json(admin: &Admin) -> Value {
    let mut value = account_json(&admin.account);
    value["id"] = json!(admin.id);
    value["email"] = json!(admin.email);
    value["first_name"] = json!(admin.first_name);
    value["last_name"] = json!(admin.last_name);
    value["phone"] = json!(admin.phone);
    value["admin_id"] = json!(admin.staff_code);
    value["department"] = json!(admin.department);
    value["position"] = json!(admin.position);
    value["hire_date"] = json!(admin.hire_date);
    value["admin_level"] = json!(admin.admin_level);
    value["access_level"] = json!(admin.access_level);
    value["permissions"] = json!(admin.permissions);
    value["allowed_modules"] = json!(admin.allowed_modules);
    value["session_timeout_minutes"] = json!(admin.session_timeout_minutes);
    value["password_expiry_days"] = json!(admin.password_expiry_days);
    value
}

pub fn principal_json(principal: &Principal) -> Value {
    match principal {
        Principal::User(u) => user_json(u),
        Principal::Client(c) => client_json(c),
        Principal::Employee(e) => employee_json(e),
        Principal::Admin(a) => admin_json(a),
    }
}

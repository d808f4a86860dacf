//! Consistent error responses.
//!
//! Every failure leaving the API has the stable shape
//! `{"success": false, "message": …, "errors"?: […]}` and one of the
//! HTTP-equivalent categories from the error taxonomy.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use salespoint_auth::{LoginError, PasswordError, StoreError, TokenError};
use salespoint_core::DomainError;

/// Per-field validation failure, reported alongside the 400.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Bad input shape. Recoverable by the caller.
    Validation { message: String, errors: Vec<FieldError> },

    // Authentication (401)
    NoToken,
    MalformedToken,
    ExpiredToken,
    InvalidRole,
    InvalidCredentials,

    // Account state
    Inactive,
    /// Gate-side rejection: principal missing or soft-disabled.
    InactiveOrInvalid,
    PasswordExpired,
    Locked,

    // Subscription (402)
    SubscriptionInactive,

    // Authorization
    Unauthenticated,
    Forbidden(String),

    // Data conflicts / lookups
    Conflict(String),
    NotFound(String),

    /// Store or hashing failure. Logged, surfaced as 500, never retried.
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NoToken
            | ApiError::MalformedToken
            | ApiError::ExpiredToken
            | ApiError::InvalidRole
            | ApiError::InvalidCredentials
            | ApiError::Inactive
            | ApiError::InactiveOrInvalid
            | ApiError::PasswordExpired
            | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::SubscriptionInactive => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Locked => StatusCode::LOCKED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::NoToken => "No token, authorization denied".to_string(),
            ApiError::MalformedToken => "Token is not valid".to_string(),
            ApiError::ExpiredToken => "Token has expired".to_string(),
            ApiError::InvalidRole => "Invalid token role".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::Inactive => "Account is deactivated".to_string(),
            ApiError::InactiveOrInvalid => {
                "Token is not valid or account is inactive".to_string()
            }
            ApiError::PasswordExpired => {
                "Password has expired. Please reset your password.".to_string()
            }
            ApiError::Locked => {
                "Account is temporarily locked due to multiple failed login attempts".to_string()
            }
            ApiError::SubscriptionInactive => "Subscription is not active".to_string(),
            ApiError::Unauthenticated => "Access denied, no token provided".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::Conflict(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed with internal error");
        }

        let mut body = json!({
            "success": false,
            "message": self.message(),
        });
        if let ApiError::Validation { errors, .. } = &self
            && !errors.is_empty()
        {
            body["errors"] = json!(errors);
        }

        (self.status(), Json(body)).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::ExpiredToken,
            TokenError::Malformed => ApiError::MalformedToken,
            TokenError::Signing(e) => ApiError::Internal(format!("token signing: {e}")),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::Conflict("Email already registered".into()),
            StoreError::DuplicateStaffCode => ApiError::Conflict("Staff ID already exists".into()),
            StoreError::NotFound => ApiError::NotFound("Record not found".into()),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::Locked => ApiError::Locked,
            LoginError::Inactive => ApiError::Inactive,
            LoginError::SubscriptionInactive => ApiError::SubscriptionInactive,
            LoginError::PasswordExpired => ApiError::PasswordExpired,
            LoginError::Store(e) => e.into(),
            LoginError::Password(e) => e.into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(format!("password hashing: {e}"))
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => ApiError::validation(msg, Vec::new()),
            DomainError::InvalidId(msg) => ApiError::validation(msg, Vec::new()),
            DomainError::NotFound => ApiError::NotFound("Record not found".into()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

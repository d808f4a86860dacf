//! Login, registration, and session routes, one set per principal type.
//!
//! The login flow itself lives in `salespoint_auth::service`; these handlers
//! validate input, map store conflicts to caller-facing messages, and mint
//! tokens.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};

use salespoint_auth::store::StoreError;
use salespoint_auth::{
    Admin, Client, ContactPerson, Credential, Employee, Principal, User, UserRole, permissions,
    service,
};

use crate::app::errors::ApiError;
use crate::app::routes::common::data_response;
use crate::app::services::AppServices;
use crate::app::{dto, dto::Validator};
use crate::context::AuthContext;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/user/register", post(register_user))
        .route("/user/login", post(login_user))
        .route("/vendor/login", post(login_vendor))
        .route("/client/register", post(register_client))
        .route("/client/login", post(login_client))
        .route("/employee/register", post(register_employee))
        .route("/employee/login", post(login_employee))
        .route("/admin/register", post(register_admin))
        .route("/admin/login", post(login_admin))
}

/// Routes behind the authentication gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/password", put(change_password))
        .route("/profile", put(update_profile))
}

fn login_response(key: &str, principal: Value, token: String) -> axum::response::Response {
    data_response(StatusCode::OK, "Login successful", key, principal, Some(token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Logins
// ─────────────────────────────────────────────────────────────────────────────

pub async fn login_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let email = dto::validate_login(&body)?;
    let now = Utc::now();

    let user = service::login(services.users.as_ref(), &email, &body.password, now).await?;
    let token = services
        .issuer
        .issue(Credential::id(&user), &user.email, user.token_role(), now)?;

    Ok(login_response("user", dto::user_json(&user), token))
}

/// Vendor login: the user store restricted to vendor-role accounts. A plain
/// user account here behaves like an unknown email.
pub async fn login_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let email = dto::validate_login(&body)?;
    let now = Utc::now();

    let vendor = service::login_filtered(
        services.users.as_ref(),
        &email,
        &body.password,
        now,
        |u: &User| u.role == UserRole::Vendor,
    )
    .await?;
    let token = services
        .issuer
        .issue(Credential::id(&vendor), &vendor.email, vendor.token_role(), now)?;

    Ok(login_response("user", dto::user_json(&vendor), token))
}

pub async fn login_client(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let email = dto::validate_login(&body)?;
    let now = Utc::now();

    let client = service::login(services.clients.as_ref(), &email, &body.password, now).await?;
    let token = services
        .issuer
        .issue(Credential::id(&client), &client.email, client.token_role(), now)?;

    Ok(login_response("client", dto::client_json(&client), token))
}

pub async fn login_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let email = dto::validate_login(&body)?;
    let now = Utc::now();

    let employee =
        service::login(services.employees.as_ref(), &email, &body.password, now).await?;
    let token = services.issuer.issue(
        Credential::id(&employee),
        &employee.email,
        employee.token_role(),
        now,
    )?;

    Ok(login_response("employee", dto::employee_json(&employee), token))
}

pub async fn login_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let email = dto::validate_login(&body)?;
    let now = Utc::now();

    let admin = service::login(services.admins.as_ref(), &email, &body.password, now).await?;
    let token = services
        .issuer
        .issue(Credential::id(&admin), &admin.email, admin.token_role(), now)?;

    Ok(login_response("admin", dto::admin_json(&admin), token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Registrations
// ─────────────────────────────────────────────────────────────────────────────

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.name("first_name", &body.first_name);
    v.name("last_name", &body.last_name);
    let email = v.finish_with(email)?;

    let now = Utc::now();
    let digest = service::hash_blocking(body.password).await?;

    let mut user = User::new(
        email,
        digest,
        body.first_name.trim().to_string(),
        body.last_name.trim().to_string(),
        body.role.unwrap_or_default(),
        now,
    );
    user.phone = body.phone;

    services.users.insert(user.clone()).await.map_err(|e| match e {
        StoreError::DuplicateEmail => {
            ApiError::Conflict("User with this email already exists".into())
        }
        other => other.into(),
    })?;

    let token = services
        .issuer
        .issue(Credential::id(&user), &user.email, user.token_role(), now)?;

    Ok(data_response(
        StatusCode::CREATED,
        "User registered successfully",
        "user",
        dto::user_json(&user),
        Some(token),
    ))
}

pub async fn register_client(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterClientRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.length("company_name", &body.company_name, 2, 100);
    v.name("contact_person.first_name", &body.contact_person.first_name);
    v.name("contact_person.last_name", &body.contact_person.last_name);
    let email = v.finish_with(email)?;

    let now = Utc::now();
    let digest = service::hash_blocking(body.password).await?;

    let client = Client::new(
        email,
        digest,
        body.company_name.trim().to_string(),
        ContactPerson {
            first_name: body.contact_person.first_name.trim().to_string(),
            last_name: body.contact_person.last_name.trim().to_string(),
            phone: body.contact_person.phone,
            position: body.contact_person.position,
        },
        now,
    );

    services.clients.insert(client.clone()).await.map_err(|e| match e {
        StoreError::DuplicateEmail => {
            ApiError::Conflict("Client with this email already exists".into())
        }
        other => other.into(),
    })?;

    let token = services
        .issuer
        .issue(Credential::id(&client), &client.email, client.token_role(), now)?;

    Ok(data_response(
        StatusCode::CREATED,
        "Client registered successfully",
        "client",
        dto::client_json(&client),
        Some(token),
    ))
}

pub async fn register_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterEmployeeRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.name("first_name", &body.first_name);
    v.name("last_name", &body.last_name);
    v.length("employee_id", &body.employee_id, 2, 20);
    v.length("department", &body.department, 2, 100);
    v.length("position", &body.position, 2, 100);
    let email = v.finish_with(email)?;

    if let Some(permissions) = &body.permissions {
        permissions::validate_employee_permissions(permissions)?;
    }

    let now = Utc::now();
    let digest = service::hash_blocking(body.password).await?;

    let mut employee = Employee::new(
        email,
        digest,
        body.first_name.trim().to_string(),
        body.last_name.trim().to_string(),
        body.employee_id.trim().to_string(),
        body.department.trim().to_string(),
        body.position.trim().to_string(),
        body.role.unwrap_or_default(),
        now,
    );
    employee.phone = body.phone;
    if let Some(permissions) = body.permissions {
        employee.permissions = permissions;
    }

    services
        .employees
        .insert(employee.clone())
        .await
        .map_err(|e| match e {
            StoreError::DuplicateEmail => {
                ApiError::Conflict("Employee with this email already exists".into())
            }
            StoreError::DuplicateStaffCode => ApiError::Conflict("Employee ID already exists".into()),
            other => other.into(),
        })?;

    let token = services.issuer.issue(
        Credential::id(&employee),
        &employee.email,
        employee.token_role(),
        now,
    )?;

    Ok(data_response(
        StatusCode::CREATED,
        "Employee registered successfully",
        "employee",
        dto::employee_json(&employee),
        Some(token),
    ))
}

pub async fn register_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterAdminRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.name("first_name", &body.first_name);
    v.name("last_name", &body.last_name);
    v.length("admin_id", &body.admin_id, 2, 20);
    v.length("department", &body.department, 2, 100);
    v.length("position", &body.position, 2, 100);
    let email = v.finish_with(email)?;

    let now = Utc::now();
    let digest = service::hash_blocking(body.password).await?;

    let mut admin = Admin::new(
        email,
        digest,
        body.first_name.trim().to_string(),
        body.last_name.trim().to_string(),
        body.admin_id.trim().to_string(),
        body.department.trim().to_string(),
        body.position.trim().to_string(),
        body.admin_level.unwrap_or_default(),
        body.access_level.unwrap_or_default(),
        now,
    );
    admin.phone = body.phone;

    services.admins.insert(admin.clone()).await.map_err(|e| match e {
        StoreError::DuplicateEmail => {
            ApiError::Conflict("Admin with this email already exists".into())
        }
        StoreError::DuplicateStaffCode => ApiError::Conflict("Admin ID already exists".into()),
        other => other.into(),
    })?;

    let token = services
        .issuer
        .issue(Credential::id(&admin), &admin.email, admin.token_role(), now)?;

    Ok(data_response(
        StatusCode::CREATED,
        "Admin registered successfully",
        "admin",
        dto::admin_json(&admin),
        Some(token),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session routes
// ─────────────────────────────────────────────────────────────────────────────

/// Current principal, dispatched by role.
pub async fn me(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": { "user": dto::principal_json(ctx.principal()) },
    }))
}

/// Stateless-token logout: nothing to invalidate server-side. The token
/// stays valid until its natural expiry; a deny-list would be a new
/// component, deliberately not added here.
pub async fn logout(Extension(_ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

/// Works authenticated or anonymous (mounted behind `optional_auth`).
pub async fn session(ctx: Option<Extension<AuthContext>>) -> impl IntoResponse {
    match ctx {
        Some(Extension(ctx)) => Json(json!({
            "success": true,
            "data": {
                "authenticated": true,
                "id": ctx.principal_id(),
                "role": ctx.role(),
            },
        })),
        None => Json(json!({
            "success": true,
            "data": { "authenticated": false },
        })),
    }
}

/// Password change for the authenticated principal, any role.
///
/// The new digest is produced here, once; for admins the expiry clock
/// restarts as well.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    v.required_password(&body.current_password);
    v.password(&body.new_password);
    v.finish()?;

    let current_digest = ctx.principal().account().password_hash.clone();
    if !service::verify_blocking(body.current_password, current_digest).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let now = Utc::now();
    let digest = service::hash_blocking(body.new_password).await?;

    match ctx.principal() {
        Principal::User(user) => {
            let mut user = user.clone();
            user.account.password_hash = digest;
            user.account.touch(now);
            services.users.update(user).await?;
        }
        Principal::Client(client) => {
            let mut client = client.clone();
            client.account.password_hash = digest;
            client.account.touch(now);
            services.clients.update(client).await?;
        }
        Principal::Employee(employee) => {
            let mut employee = employee.clone();
            employee.account.password_hash = digest;
            employee.account.touch(now);
            services.employees.update(employee).await?;
        }
        Principal::Admin(admin) => {
            let mut admin = admin.clone();
            admin.set_password_hash(digest, now);
            services.admins.update(admin).await?;
        }
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Password updated successfully",
        })),
    )
        .into_response())
}

/// Profile update for the authenticated principal, any role. Only the
/// fields present in the request change.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut v = Validator::new();
    if let Some(first_name) = &body.first_name {
        v.name("first_name", first_name);
    }
    if let Some(last_name) = &body.last_name {
        v.name("last_name", last_name);
    }
    if let Some(company_name) = &body.company_name {
        v.length("company_name", company_name, 2, 100);
    }
    v.finish()?;

    let now = Utc::now();
    let principal = match ctx.principal() {
        Principal::User(user) => {
            let mut user = user.clone();
            if let Some(first_name) = body.first_name {
                user.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = body.last_name {
                user.last_name = last_name.trim().to_string();
            }
            if let Some(phone) = body.phone {
                user.phone = Some(phone);
            }
            user.account.touch(now);
            services.users.update(user.clone()).await?;
            Principal::User(user)
        }
        Principal::Client(client) => {
            let mut client = client.clone();
            if let Some(first_name) = body.first_name {
                client.contact.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = body.last_name {
                client.contact.last_name = last_name.trim().to_string();
            }
            if let Some(phone) = body.phone {
                client.contact.phone = Some(phone);
            }
            if let Some(company_name) = body.company_name {
                client.company_name = company_name.trim().to_string();
            }
            client.account.touch(now);
            services.clients.update(client.clone()).await?;
            Principal::Client(client)
        }
        Principal::Employee(employee) => {
            let mut employee = employee.clone();
            if let Some(first_name) = body.first_name {
                employee.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = body.last_name {
                employee.last_name = last_name.trim().to_string();
            }
            if let Some(phone) = body.phone {
                employee.phone = Some(phone);
            }
            employee.account.touch(now);
            services.employees.update(employee.clone()).await?;
            Principal::Employee(employee)
        }
        Principal::Admin(admin) => {
            let mut admin = admin.clone();
            if let Some(first_name) = body.first_name {
                admin.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = body.last_name {
                admin.last_name = last_name.trim().to_string();
            }
            if let Some(phone) = body.phone {
                admin.phone = Some(phone);
            }
            admin.account.touch(now);
            services.admins.update(admin.clone()).await?;
            Principal::Admin(admin)
        }
    };

    Ok(data_response(
        StatusCode::OK,
        "Profile updated successfully",
        "user",
        dto::principal_json(&principal),
        None,
    ))
}

//! Employee provisioning and account administration.
//!
//! Provisioning differs from self-registration: the employee id is generated
//! server-side (year-scoped "EMP…" sequence) and the routes are admin-gated.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use salespoint_auth::lockout::LockoutStatus;
use salespoint_auth::principal::EMPLOYEE_CODE_PREFIX;
use salespoint_auth::store::StoreError;
use salespoint_auth::{Employee, Principal, TokenRole, permissions, service};
use salespoint_store::allocate_staff_code;

use crate::app::errors::ApiError;
use crate::app::routes::common::{data_response, parse_id};
use crate::app::services::AppServices;
use crate::app::{dto, dto::Validator};
use crate::authz;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(provision))
        .route("/profile", get(profile))
        .route("/:id/permissions", put(update_permissions))
        .route("/:id/unlock", post(unlock))
        .route("/:id/suspend", post(suspend))
        .route("/:id/activate", post(activate))
        .route("/:id", delete(remove))
}

/// POST /api/employees — create an employee with a generated id.
pub async fn provision(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ProvisionEmployeeRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;

    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.name("first_name", &body.first_name);
    v.name("last_name", &body.last_name);
    v.length("department", &body.department, 2, 100);
    v.length("position", &body.position, 2, 100);
    let email = v.finish_with(email)?;

    let now = Utc::now();
    let staff_code =
        allocate_staff_code(services.employees.as_ref(), EMPLOYEE_CODE_PREFIX, now).await?;
    let digest = service::hash_blocking(body.password).await?;

    let mut employee = Employee::new(
        email,
        digest,
        body.first_name.trim().to_string(),
        body.last_name.trim().to_string(),
        staff_code,
        body.department.trim().to_string(),
        body.position.trim().to_string(),
        body.role.unwrap_or_default(),
        now,
    );
    employee.phone = body.phone;

    services
        .employees
        .insert(employee.clone())
        .await
        .map_err(|e| match e {
            StoreError::DuplicateEmail => {
                ApiError::Conflict("Employee with this email already exists".into())
            }
            other => other.into(),
        })?;

    Ok(data_response(
        StatusCode::CREATED,
        "Employee created successfully",
        "employee",
        dto::employee_json(&employee),
        None,
    ))
}

/// GET /api/employees/profile — the caller's own record.
pub async fn profile(
    Extension(ctx): Extension<AuthContext>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_role(&ctx, &[TokenRole::Employee])?;

    match ctx.principal() {
        Principal::Employee(employee) => Ok(data_response(
            StatusCode::OK,
            "Profile",
            "employee",
            dto::employee_json(employee),
            None,
        )),
        _ => Err(ApiError::Forbidden(
            "Access denied, insufficient permissions".into(),
        )),
    }
}

/// PUT /api/employees/:id/permissions — replace the permission set.
pub async fn update_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePermissionsRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;
    let id = parse_id(&id)?;

    permissions::validate_employee_permissions(&body.permissions)?;

    let mut employee = services
        .employees
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    employee.permissions = body.permissions;
    employee.account.touch(Utc::now());
    services.employees.update(employee.clone()).await?;

    Ok(data_response(
        StatusCode::OK,
        "Permissions updated successfully",
        "employee",
        dto::employee_json(&employee),
        None,
    ))
}

/// POST /api/employees/:id/unlock — clear the lock and the failure counter.
pub async fn unlock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;
    let id = parse_id(&id)?;

    let mut employee = services
        .employees
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    employee.account.apply_lockout(LockoutStatus::default());
    employee.account.touch(Utc::now());
    services.employees.update(employee.clone()).await?;

    Ok(data_response(
        StatusCode::OK,
        "Account unlocked successfully",
        "employee",
        dto::employee_json(&employee),
        None,
    ))
}

/// POST /api/employees/:id/suspend — soft-disable.
pub async fn suspend(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    set_active(services, ctx, id, false).await
}

/// POST /api/employees/:id/activate — re-enable.
pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    set_active(services, ctx, id, true).await
}

async fn set_active(
    services: Arc<AppServices>,
    ctx: AuthContext,
    id: String,
    active: bool,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;
    let id = parse_id(&id)?;

    let mut employee = services
        .employees
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    employee.account.is_active = active;
    employee.account.touch(Utc::now());
    services.employees.update(employee.clone()).await?;

    let message = if active {
        "Account activated successfully"
    } else {
        "Account suspended successfully"
    };
    Ok(data_response(
        StatusCode::OK,
        message,
        "employee",
        dto::employee_json(&employee),
        None,
    ))
}

/// DELETE /api/employees/:id — hard delete. Self-delete is blocked.
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;
    let id = parse_id(&id)?;

    if id == ctx.principal_id() {
        return Err(ApiError::Forbidden(
            "You cannot delete your own account".into(),
        ));
    }

    services.employees.delete(id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Employee not found".into()),
        other => other.into(),
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Employee deleted successfully",
        })),
    )
        .into_response())
}

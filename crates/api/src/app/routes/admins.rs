//! Admin provisioning and account administration.
//!
//! Everything here except the profile route requires super_admin level, and
//! two invariants are enforced on delete: no self-delete, and super_admin
//! accounts cannot be deleted at all.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use salespoint_auth::lockout::LockoutStatus;
use salespoint_auth::principal::ADMIN_CODE_PREFIX;
use salespoint_auth::store::StoreError;
use salespoint_auth::{Admin, Principal, service};
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

/// POST /api/admins — create an admin with a generated id and the default
/// grants for its level and access tier.
pub async fn provision(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ProvisionAdminRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_super_admin(&ctx)?;

    let mut v = Validator::new();
    let email = v.email(&body.email);
    v.password(&body.password);
    v.name("first_name", &body.first_name);
    v.name("last_name", &body.last_name);
    v.length("department", &body.department, 2, 100);
    v.length("position", &body.position, 2, 100);
    let email = v.finish_with(email)?;

    let now = Utc::now();
    let staff_code = allocate_staff_code(services.admins.as_ref(), ADMIN_CODE_PREFIX, now).await?;
    let digest = service::hash_blocking(body.password).await?;

    let mut admin = Admin::new(
        email,
        digest,
        body.first_name.trim().to_string(),
        body.last_name.trim().to_string(),
        staff_code,
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
        other => other.into(),
    })?;

    Ok(data_response(
        StatusCode::CREATED,
        "Admin created successfully",
        "admin",
        dto::admin_json(&admin),
        None,
    ))
}

/// GET /api/admins/profile — the caller's own record.
pub async fn profile(
    Extension(ctx): Extension<AuthContext>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&ctx)?;

    match ctx.principal() {
        Principal::Admin(admin) => Ok(data_response(
            StatusCode::OK,
            "Profile",
            "admin",
            dto::admin_json(admin),
            None,
        )),
        _ => Err(ApiError::Forbidden(
            "Access denied, insufficient permissions".into(),
        )),
    }
}

/// PUT /api/admins/:id/permissions — replace the permission set.
pub async fn update_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePermissionsRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_super_admin(&ctx)?;
    let id = parse_id(&id)?;

    let mut admin = services
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    admin.permissions = body.permissions;
    admin.account.touch(Utc::now());
    services.admins.update(admin.clone()).await?;

    Ok(data_response(
        StatusCode::OK,
        "Permissions updated successfully",
        "admin",
        dto::admin_json(&admin),
        None,
    ))
}

/// POST /api/admins/:id/unlock — clear the lock and the failure counter.
pub async fn unlock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_super_admin(&ctx)?;
    let id = parse_id(&id)?;

    let mut admin = services
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    admin.account.apply_lockout(LockoutStatus::default());
    admin.account.touch(Utc::now());
    services.admins.update(admin.clone()).await?;

    Ok(data_response(
        StatusCode::OK,
        "Account unlocked successfully",
        "admin",
        dto::admin_json(&admin),
        None,
    ))
}

/// POST /api/admins/:id/suspend — soft-disable.
pub async fn suspend(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    set_active(services, ctx, id, false).await
}

/// POST /api/admins/:id/activate — re-enable.
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
    authz::require_super_admin(&ctx)?;
    let id = parse_id(&id)?;

    let mut admin = services
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    admin.account.is_active = active;
    admin.account.touch(Utc::now());
    services.admins.update(admin.clone()).await?;

    let message = if active {
        "Account activated successfully"
    } else {
        "Account suspended successfully"
    };
    Ok(data_response(
        StatusCode::OK,
        message,
        "admin",
        dto::admin_json(&admin),
        None,
    ))
}

/// DELETE /api/admins/:id — hard delete, with the self-protecting guards.
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_super_admin(&ctx)?;
    let id = parse_id(&id)?;

    if id == ctx.principal_id() {
        return Err(ApiError::Forbidden(
            "You cannot delete your own account".into(),
        ));
    }

    let admin = services
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    if admin.is_super_admin() {
        return Err(ApiError::Forbidden(
            "Super admin accounts cannot be deleted".into(),
        ));
    }

    services.admins.delete(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Admin deleted successfully",
        })),
    )
        .into_response())
}

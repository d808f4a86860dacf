//! Authorization guards.
//!
//! Pure decision functions over the context the authentication gate
//! attached. No IO, no panics; every denial is terminal for the request.

use salespoint_auth::{AdminLevel, Permission, Principal, TokenRole};

use crate::app::errors::ApiError;
use crate::context::AuthContext;

/// Reject unless the context role is one of `allowed`.
pub fn require_role(ctx: &AuthContext, allowed: &[TokenRole]) -> Result<(), ApiError> {
    if allowed.contains(&ctx.role()) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Access denied, insufficient permissions".to_string(),
        ))
    }
}

/// Reject unless the principal's permission set contains `permission`.
///
/// `None` context (a route that ran without the gate) is an authentication
/// failure, not an authorization one.
pub fn require_permission(
    ctx: Option<&AuthContext>,
    permission: Permission,
) -> Result<(), ApiError> {
    let ctx = ctx.ok_or(ApiError::Unauthenticated)?;

    if ctx.principal().has_permission(permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Access denied, missing permission '{}'",
            permission.as_str()
        )))
    }
}

pub fn require_admin(ctx: &AuthContext) -> Result<(), ApiError> {
    require_role(ctx, &[TokenRole::Admin])
}

pub fn require_employee_or_admin(ctx: &AuthContext) -> Result<(), ApiError> {
    require_role(ctx, &[TokenRole::Employee, TokenRole::Admin])
}

/// Reject unless the principal is an admin at the super_admin level.
pub fn require_super_admin(ctx: &AuthContext) -> Result<(), ApiError> {
    require_admin(ctx)?;
    match ctx.principal() {
        Principal::Admin(admin) if admin.admin_level == AdminLevel::SuperAdmin => Ok(()),
        _ => Err(ApiError::Forbidden(
            "Access denied, super admin level required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use salespoint_auth::roles::EmployeeRole;
    use salespoint_auth::{Credential, Employee};
    use salespoint_core::EmailAddress;

    fn employee_ctx(permissions: Vec<Permission>) -> AuthContext {
        let mut employee = Employee::new(
            EmailAddress::parse("e1@x.com").unwrap(),
            "digest".into(),
            "A".into(),
            "B".into(),
            "EMP240001".into(),
            "Sales".into(),
            "Clerk".into(),
            EmployeeRole::Employee,
            Utc::now(),
        );
        employee.permissions = permissions;
        AuthContext::new(
            Credential::id(&employee),
            TokenRole::Employee,
            Principal::Employee(employee),
        )
    }

    #[test]
    fn missing_permission_is_forbidden_until_granted() {
        let ctx = employee_ctx(vec![Permission::ViewDashboard]);
        let denied = require_permission(Some(&ctx), Permission::ManageProducts);
        assert!(matches!(denied, Err(ApiError::Forbidden(_))));

        let ctx = employee_ctx(vec![Permission::ViewDashboard, Permission::ManageProducts]);
        assert!(require_permission(Some(&ctx), Permission::ManageProducts).is_ok());
    }

    #[test]
    fn no_context_is_unauthenticated_not_forbidden() {
        let denied = require_permission(None, Permission::ViewDashboard);
        assert!(matches!(denied, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn role_checks_gate_by_token_role() {
        let ctx = employee_ctx(Vec::new());
        assert!(require_employee_or_admin(&ctx).is_ok());
        assert!(matches!(require_admin(&ctx), Err(ApiError::Forbidden(_))));
        assert!(matches!(require_super_admin(&ctx), Err(ApiError::Forbidden(_))));
    }
}

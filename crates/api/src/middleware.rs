//! Authentication gate.
//!
//! `require_auth` resolves a bearer token to an [`AuthContext`] or rejects
//! the request; `optional_auth` is the non-blocking variant for routes that
//! work both authenticated and anonymous — any failure degrades to "no
//! principal attached" instead of a rejection.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};

use salespoint_auth::{Principal, TokenClaims, TokenRole};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

pub async fn require_auth(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(&state.services, req.headers(), Utc::now()).await?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

pub async fn optional_auth(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Ok(ctx) = authenticate(&state.services, req.headers(), Utc::now()).await {
        req.extensions_mut().insert(ctx);
    }
    next.run(req).await
}

/// Token → principal resolution, in gate order: extract, verify, dispatch on
/// role, load + liveness check, role-specific checks.
async fn authenticate(
    services: &AppServices,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Result<AuthContext, ApiError> {
    let token = extract_bearer(headers)?;
    let claims = services.verifier.verify(token)?;
    let principal = resolve_principal(services, &claims, now).await?;

    Ok(AuthContext::new(claims.id, claims.role, principal))
}

/// Dispatch on the token role to the matching credential store and run that
/// role's extra checks. Adding a principal type means adding an arm here.
async fn resolve_principal(
    services: &AppServices,
    claims: &TokenClaims,
    now: DateTime<Utc>,
) -> Result<Principal, ApiError> {
    match claims.role {
        TokenRole::User | TokenRole::Vendor => {
            let user = services.users.find_by_id(claims.id).await?;
            let user = user
                .filter(|u| u.account.is_active)
                .ok_or(ApiError::InactiveOrInvalid)?;
            Ok(Principal::User(user))
        }
        TokenRole::Client => {
            let client = services.clients.find_by_id(claims.id).await?;
            let client = client
                .filter(|c| c.account.is_active)
                .ok_or(ApiError::InactiveOrInvalid)?;

            // Lapsed subscription is a payment problem, not an auth problem.
            if !client.subscription.is_active(now) {
                return Err(ApiError::SubscriptionInactive);
            }
            Ok(Principal::Client(client))
        }
        TokenRole::Employee => {
            let employee = services.employees.find_by_id(claims.id).await?;
            let employee = employee
                .filter(|e| e.account.is_active)
                .ok_or(ApiError::InactiveOrInvalid)?;

            if employee.account.is_locked(now) {
                return Err(ApiError::Locked);
            }
            Ok(Principal::Employee(employee))
        }
        TokenRole::Admin => {
            let admin = services.admins.find_by_id(claims.id).await?;
            let admin = admin
                .filter(|a| a.account.is_active)
                .ok_or(ApiError::InactiveOrInvalid)?;

            if admin.account.is_locked(now) {
                return Err(ApiError::Locked);
            }
            Ok(Principal::Admin(admin))
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(ApiError::NoToken)?;

    let header = header.to_str().map_err(|_| ApiError::NoToken)?;

    let token = header.strip_prefix("Bearer ").ok_or(ApiError::NoToken)?.trim();
    if token.is_empty() {
        return Err(ApiError::NoToken);
    }

    Ok(token)
}

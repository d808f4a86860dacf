use axum::Router;

pub mod admins;
pub mod auth;
pub mod common;
pub mod employees;
pub mod system;

/// Router for everything behind the authentication gate.
pub fn protected_router() -> Router {
    Router::new()
        .nest("/api/auth", auth::protected_router())
        .nest("/api/employees", employees::router())
        .nest("/api/admins", admins::router())
}

//! Request context attached by the authentication gate.

use uuid::Uuid;

use salespoint_auth::{Principal, TokenRole};

/// Authenticated principal context for a request.
///
/// Carries the `{id, role}` pair from the verified token claims plus the
/// freshly loaded principal record. Downstream handlers and the
/// authorization guards read from this; nothing re-verifies the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    principal_id: Uuid,
    role: TokenRole,
    principal: Principal,
}

impl AuthContext {
    pub fn new(principal_id: Uuid, role: TokenRole, principal: Principal) -> Self {
        Self {
            principal_id,
            role,
            principal,
        }
    }

    pub fn principal_id(&self) -> Uuid {
        self.principal_id
    }

    pub fn role(&self) -> TokenRole {
        self.role
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

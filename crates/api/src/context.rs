use chrono::{DateTime, Utc};

use cargodesk_auth::{Role, SessionClaims};

/// Authenticated admin session for a request.
///
/// Inserted by the auth middleware; present on every admin route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    username: String,
    role: Role,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            role: claims.role.clone(),
            expires_at: claims.expires_at(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

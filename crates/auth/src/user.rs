use chrono::{DateTime, Utc};
use serde::Serialize;

use invoicehub_core::{TenantId, UserId};

/// A user account. Belongs to exactly one tenant for its whole life.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tenant_id: TenantId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// What a user may see about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tenant_id: TenantId,
    pub tenant_name: String,
}

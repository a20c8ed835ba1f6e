use serde::Serialize;

use invoicehub_core::{TenantId, UserId};

use crate::IdentityClaims;

/// Identity resolved from a verified token, scoped to one request.
///
/// Handed explicitly to every operation that needs tenant or user awareness;
/// there is no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    user_id: UserId,
    tenant_id: TenantId,
    username: String,
}

impl Identity {
    pub fn new(user_id: UserId, tenant_id: TenantId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            tenant_id,
            username: username.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.user_id,
            tenant_id: claims.tenant_id,
            username: claims.sub,
        }
    }
}

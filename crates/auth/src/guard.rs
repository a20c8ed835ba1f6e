//! Tenant authorization guard.
//!
//! Every read or write of a tenant-owned resource goes through here. A
//! mismatch is reported as "not found" so callers cannot probe for the
//! existence of another tenant's data.

use thiserror::Error;

use invoicehub_core::{DomainError, TenantId};

use crate::identity::Identity;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no authenticated identity")]
    Anonymous,

    #[error("resource belongs to another tenant")]
    TenantMismatch,
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::not_found()
    }
}

/// Check that a stored resource belongs to the caller's tenant.
pub fn assert_tenant_match(resource_tenant: TenantId, caller: Option<&Identity>) -> Result<(), AuthzError> {
    let Some(caller) = caller else {
        tracing::warn!(resource_tenant = %resource_tenant, "tenant check without identity");
        return Err(AuthzError::Anonymous);
    };

    if caller.tenant_id() != resource_tenant {
        tracing::warn!(
            resource_tenant = %resource_tenant,
            caller_tenant = %caller.tenant_id(),
            user_id = %caller.user_id(),
            "cross-tenant access denied"
        );
        return Err(AuthzError::TenantMismatch);
    }

    Ok(())
}

/// Check the explicit tenant parameter of a tenant-scoped call.
pub fn authorize_tenant(requested: TenantId, caller: &Identity) -> Result<(), AuthzError> {
    assert_tenant_match(requested, Some(caller))
}

use async_trait::async_trait;

use invoicehub_core::{DomainResult, TenantId, UserId};

use crate::{Tenant, User};

/// Persistence for tenants and user accounts.
///
/// Implementations must be internally synchronized; one handle is shared by
/// every request.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new tenant together with its first user, atomically.
    ///
    /// Fails with `DomainError::Conflict` if any unique field (username,
    /// email, tenant slug, tenant name) is already taken; nothing is written
    /// in that case.
    async fn register(&self, tenant: Tenant, user: User) -> DomainResult<()>;

    async fn find_tenant_by_id(&self, id: TenantId) -> DomainResult<Option<Tenant>>;

    async fn find_tenant_by_slug(&self, slug: &str) -> DomainResult<Option<Tenant>>;

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    async fn username_taken(&self, username: &str) -> DomainResult<bool>;

    async fn email_taken(&self, email: &str) -> DomainResult<bool>;

    async fn tenant_slug_taken(&self, slug: &str) -> DomainResult<bool>;

    async fn tenant_name_taken(&self, name: &str) -> DomainResult<bool>;
}

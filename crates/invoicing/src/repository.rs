use async_trait::async_trait;
use chrono::{DateTime, Utc};

use invoicehub_core::{DomainResult, InvoiceId, TenantId};

use crate::{Invoice, InvoiceStatus};

/// Invoice persistence.
///
/// Reads by id are deliberately *not* tenant-scoped: the caller runs the
/// tenant guard on what comes back. Listing is scoped at the query level.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist an invoice and its line items as one unit.
    ///
    /// Fails with `DomainError::Conflict` if the tenant already has an
    /// invoice with the same number.
    async fn insert(&self, invoice: Invoice) -> DomainResult<()>;

    async fn find_by_id(&self, id: InvoiceId) -> DomainResult<Option<Invoice>>;

    async fn find_by_number(&self, tenant_id: TenantId, invoice_number: &str) -> DomainResult<Option<Invoice>>;

    /// All invoices of a tenant, newest first.
    async fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Invoice>>;

    /// Set the status only if it is still `expected`.
    ///
    /// Fails with `DomainError::NotFound` if no such invoice exists in
    /// `tenant_id`, and with `DomainError::Conflict` if the stored status is no
    /// longer `expected`.
    async fn update_status(
        &self,
        id: InvoiceId,
        tenant_id: TenantId,
        expected: InvoiceStatus,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()>;
}

//! Tenant-checked invoice operations.

use std::sync::Arc;

use chrono::Utc;

use invoicehub_auth::{Identity, assert_tenant_match, authorize_tenant};
use invoicehub_core::{DomainError, DomainResult, InvoiceId, TenantId};

use crate::{ExtractionClient, Invoice, InvoiceRepository, InvoiceStatus, NewInvoice};

#[derive(Clone)]
pub struct InvoiceService {
    pub(crate) repo: Arc<dyn InvoiceRepository>,
    pub(crate) extractor: Arc<dyn ExtractionClient>,
}

impl InvoiceService {
    pub fn new(repo: Arc<dyn InvoiceRepository>, extractor: Arc<dyn ExtractionClient>) -> Self {
        Self { repo, extractor }
    }

    /// Manually create a `PENDING` invoice.
    pub async fn create_invoice(
        &self,
        caller: &Identity,
        tenant_id: TenantId,
        new: NewInvoice,
    ) -> DomainResult<Invoice> {
        authorize_tenant(tenant_id, caller)?;

        let invoice = Invoice::create(tenant_id, new, InvoiceStatus::Pending, Utc::now())?;
        self.persist_new(invoice).await
    }

    pub async fn list_invoices(&self, caller: &Identity, tenant_id: TenantId) -> DomainResult<Vec<Invoice>> {
        authorize_tenant(tenant_id, caller)?;
        self.repo.list_by_tenant(tenant_id).await
    }

    pub async fn get_invoice(
        &self,
        caller: &Identity,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> DomainResult<Invoice> {
        authorize_tenant(tenant_id, caller)?;

        let invoice = self
            .repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(DomainError::not_found)?;

        assert_tenant_match(invoice.tenant_id, Some(caller))?;
        Ok(invoice)
    }

    /// Move an invoice along its lifecycle.
    ///
    /// Re-setting the current status succeeds without touching storage. The
    /// write only lands if the stored status is still the one the transition
    /// was validated against; otherwise the call fails with a conflict.
    pub async fn update_status(
        &self,
        caller: &Identity,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> DomainResult<Invoice> {
        let mut invoice = self.get_invoice(caller, tenant_id, invoice_id).await?;
        let from = invoice.status;

        if invoice.transition(status, Utc::now())? {
            self.repo
                .update_status(invoice.id, invoice.tenant_id, from, invoice.status, invoice.updated_at)
                .await?;
            tracing::info!(
                invoice_id = %invoice.id,
                tenant_id = %invoice.tenant_id,
                user_id = %caller.user_id(),
                from = %from,
                to = %status,
                "invoice status changed"
            );
        }

        Ok(invoice)
    }

    pub(crate) async fn persist_new(&self, invoice: Invoice) -> DomainResult<Invoice> {
        if self
            .repo
            .find_by_number(invoice.tenant_id, &invoice.invoice_number)
            .await?
            .is_some()
        {
            return Err(duplicate_number(&invoice.invoice_number));
        }

        // The repository enforces uniqueness atomically; the lookup above
        // only exists for the message.
        match self.repo.insert(invoice.clone()).await {
            Ok(()) => Ok(invoice),
            Err(DomainError::Conflict(_)) => Err(duplicate_number(&invoice.invoice_number)),
            Err(e) => Err(e),
        }
    }
}

fn duplicate_number(number: &str) -> DomainError {
    DomainError::conflict(format!("invoice with number '{number}' already exists"))
}

impl core::fmt::Debug for InvoiceService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvoiceService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeExtractor, MemoryRepo, caller_in, new_invoice};
    use invoicehub_core::UserId;

    fn service() -> (InvoiceService, Arc<MemoryRepo>) {
        let repo = Arc::new(MemoryRepo::default());
        let svc = InvoiceService::new(repo.clone(), Arc::new(FakeExtractor::failing(500)));
        (svc, repo)
    }

    #[tokio::test]
    async fn manual_invoice_starts_pending() {
        let (svc, _) = service();
        let tenant = TenantId::new();
        let caller = caller_in(tenant);

        let invoice = svc.create_invoice(&caller, tenant, new_invoice("INV-1")).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.tenant_id, tenant);
    }

    #[tokio::test]
    async fn duplicate_number_is_scoped_to_tenant() {
        let (svc, _) = service();
        let (a, b) = (TenantId::new(), TenantId::new());

        svc.create_invoice(&caller_in(a), a, new_invoice("INV-1")).await.unwrap();
        let err = svc.create_invoice(&caller_in(a), a, new_invoice("INV-1")).await.unwrap_err();
        assert_eq!(err, DomainError::conflict("invoice with number 'INV-1' already exists"));

        assert!(svc.create_invoice(&caller_in(b), b, new_invoice("INV-1")).await.is_ok());
    }

    #[tokio::test]
    async fn cross_tenant_access_looks_like_not_found() {
        let (svc, _) = service();
        let (a, b) = (TenantId::new(), TenantId::new());
        let invoice = svc.create_invoice(&caller_in(a), a, new_invoice("INV-1")).await.unwrap();

        let intruder = caller_in(b);
        assert_eq!(svc.get_invoice(&intruder, b, invoice.id).await, Err(DomainError::NotFound));
        assert_eq!(svc.get_invoice(&intruder, a, invoice.id).await, Err(DomainError::NotFound));
        assert_eq!(svc.list_invoices(&intruder, a).await, Err(DomainError::NotFound));
        assert_eq!(
            svc.update_status(&intruder, b, invoice.id, InvoiceStatus::Extracted).await,
            Err(DomainError::NotFound)
        );
    }

    #[tokio::test]
    async fn list_is_filtered_and_newest_first() {
        let (svc, _) = service();
        let (a, b) = (TenantId::new(), TenantId::new());
        svc.create_invoice(&caller_in(a), a, new_invoice("A-1")).await.unwrap();
        svc.create_invoice(&caller_in(b), b, new_invoice("B-1")).await.unwrap();
        svc.create_invoice(&caller_in(a), a, new_invoice("A-2")).await.unwrap();

        let numbers: Vec<_> = svc
            .list_invoices(&caller_in(a), a)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.invoice_number)
            .collect();
        assert_eq!(numbers, ["A-2", "A-1"]);
    }

    #[tokio::test]
    async fn status_updates_are_persisted() {
        let (svc, repo) = service();
        let tenant = TenantId::new();
        let caller = caller_in(tenant);
        let invoice = svc.create_invoice(&caller, tenant, new_invoice("INV-1")).await.unwrap();

        let updated = svc
            .update_status(&caller, tenant, invoice.id, InvoiceStatus::Extracted)
            .await
            .unwrap();
        assert_eq!(updated.status, InvoiceStatus::Extracted);
        assert!(updated.updated_at >= invoice.updated_at);

        let stored = repo.find_by_id(invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Extracted);

        let err = svc
            .update_status(&caller, tenant, invoice.id, InvoiceStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn transition_from_a_stale_read_is_a_conflict() {
        let (svc, repo) = service();
        let tenant = TenantId::new();
        let caller = caller_in(tenant);
        let invoice = svc.create_invoice(&caller, tenant, new_invoice("INV-1")).await.unwrap();
        let extracted = svc
            .update_status(&caller, tenant, invoice.id, InvoiceStatus::Extracted)
            .await
            .unwrap();

        // Approved by another writer after this caller read it as extracted.
        svc.update_status(&caller, tenant, invoice.id, InvoiceStatus::Approved)
            .await
            .unwrap();
        repo.serve_stale(extracted);

        let err = svc
            .update_status(&caller, tenant, invoice.id, InvoiceStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let stored = repo.list_by_tenant(tenant).await.unwrap();
        assert_eq!(stored[0].status, InvoiceStatus::Approved);
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let (svc, _) = service();
        let tenant = TenantId::new();
        let caller = invoicehub_auth::Identity::new(UserId::new(), tenant, "alice");
        assert_eq!(
            svc.get_invoice(&caller, tenant, InvoiceId::new()).await,
            Err(DomainError::NotFound)
        );
    }
}

//! In-memory stores.
//!
//! Intended for tests/dev. Each store keeps its state behind a single
//! `RwLock`, so every write (including the uniqueness checks that precede
//! it) is atomic.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use invoicehub_auth::{CredentialStore, Tenant, User};
use invoicehub_core::{DomainError, DomainResult, InvoiceId, TenantId, UserId};
use invoicehub_invoicing::{Invoice, InvoiceRepository, InvoiceStatus};

fn poisoned() -> DomainError {
    DomainError::storage("lock poisoned")
}

#[derive(Debug, Default)]
struct Credentials {
    tenants: HashMap<TenantId, Tenant>,
    users: HashMap<UserId, User>,
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Credentials>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Credentials) -> T) -> DomainResult<T> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn register(&self, tenant: Tenant, user: User) -> DomainResult<()> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        if inner.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::conflict("username already exists"));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict("email already exists"));
        }
        if inner.tenants.values().any(|t| t.slug == tenant.slug) {
            return Err(DomainError::conflict("tenant slug already exists"));
        }
        if inner.tenants.values().any(|t| t.name == tenant.name) {
            return Err(DomainError::conflict("tenant name already exists"));
        }
        if user.tenant_id != tenant.id {
            return Err(DomainError::validation("user must belong to the tenant being registered"));
        }

        inner.tenants.insert(tenant.id, tenant);
        inner.users.insert(user.id, user);
        Ok(())
    }

    async fn find_tenant_by_id(&self, id: TenantId) -> DomainResult<Option<Tenant>> {
        self.read(|c| c.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> DomainResult<Option<Tenant>> {
        self.read(|c| c.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        self.read(|c| c.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.read(|c| c.users.values().find(|u| u.username == username).cloned())
    }

    async fn username_taken(&self, username: &str) -> DomainResult<bool> {
        self.read(|c| c.users.values().any(|u| u.username == username))
    }

    async fn email_taken(&self, email: &str) -> DomainResult<bool> {
        self.read(|c| c.users.values().any(|u| u.email == email))
    }

    async fn tenant_slug_taken(&self, slug: &str) -> DomainResult<bool> {
        self.read(|c| c.tenants.values().any(|t| t.slug == slug))
    }

    async fn tenant_name_taken(&self, name: &str) -> DomainResult<bool> {
        self.read(|c| c.tenants.values().any(|t| t.name == name))
    }
}

/// Invoices keyed by tenant, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    by_tenant: RwLock<HashMap<TenantId, Vec<Invoice>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> DomainResult<()> {
        let mut by_tenant = self.by_tenant.write().map_err(|_| poisoned())?;
        let invoices = by_tenant.entry(invoice.tenant_id).or_default();

        if invoices.iter().any(|i| i.invoice_number == invoice.invoice_number) {
            return Err(DomainError::conflict(format!(
                "invoice number '{}' already exists",
                invoice.invoice_number
            )));
        }
        invoices.push(invoice);
        Ok(())
    }

    async fn find_by_id(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        let by_tenant = self.by_tenant.read().map_err(|_| poisoned())?;
        Ok(by_tenant.values().flatten().find(|i| i.id == id).cloned())
    }

    async fn find_by_number(&self, tenant_id: TenantId, invoice_number: &str) -> DomainResult<Option<Invoice>> {
        let by_tenant = self.by_tenant.read().map_err(|_| poisoned())?;
        Ok(by_tenant
            .get(&tenant_id)
            .and_then(|invoices| invoices.iter().find(|i| i.invoice_number == invoice_number))
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Invoice>> {
        let by_tenant = self.by_tenant.read().map_err(|_| poisoned())?;
        let mut invoices: Vec<Invoice> = by_tenant
            .get(&tenant_id)
            .map(|invoices| invoices.iter().rev().cloned().collect())
            .unwrap_or_default();
        // Stable: equal timestamps keep reverse insertion order.
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    async fn update_status(
        &self,
        id: InvoiceId,
        tenant_id: TenantId,
        expected: InvoiceStatus,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut by_tenant = self.by_tenant.write().map_err(|_| poisoned())?;
        let invoice = by_tenant
            .get_mut(&tenant_id)
            .and_then(|invoices| invoices.iter_mut().find(|i| i.id == id))
            .ok_or_else(DomainError::not_found)?;
        if invoice.status != expected {
            return Err(DomainError::conflict("invoice status changed concurrently"));
        }

        invoice.status = status;
        invoice.updated_at = updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use invoicehub_invoicing::NewInvoice;
    use rust_decimal::Decimal;

    fn tenant(slug: &str) -> Tenant {
        Tenant::new(&format!("{slug} corp"), slug, Utc::now()).unwrap()
    }

    fn user(name: &str, tenant: &Tenant) -> User {
        User {
            id: UserId::new(),
            username: name.to_string(),
            email: format!("{name}@example.test"),
            password_hash: "$argon2id$stub".to_string(),
            first_name: None,
            last_name: None,
            tenant_id: tenant.id,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn invoice(tenant_id: TenantId, number: &str, created_at: DateTime<Utc>) -> Invoice {
        let new = NewInvoice {
            invoice_number: number.to_string(),
            vendor_name: "Widgets Ltd".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            total_amount: Decimal::new(1000, 2),
            ..NewInvoice::default()
        };
        Invoice::create(tenant_id, new, InvoiceStatus::Pending, created_at).unwrap()
    }

    #[tokio::test]
    async fn register_is_all_or_nothing() {
        let store = InMemoryCredentialStore::new();
        let acme = tenant("acme");
        store.register(acme.clone(), user("alice", &acme)).await.unwrap();

        // Username clash: the new tenant must not be written either.
        let globex = tenant("globex");
        let err = store.register(globex.clone(), user("alice", &globex)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(store.find_tenant_by_slug("globex").await.unwrap().is_none());

        assert!(store.find_user_by_username("alice").await.unwrap().is_some());
        assert!(store.tenant_slug_taken("acme").await.unwrap());
        assert!(store.email_taken("alice@example.test").await.unwrap());
        assert!(!store.username_taken("bob").await.unwrap());
    }

    #[tokio::test]
    async fn invoice_numbers_are_unique_per_tenant() {
        let store = InMemoryInvoiceStore::new();
        let (a, b) = (TenantId::new(), TenantId::new());
        let now = Utc::now();

        store.insert(invoice(a, "INV-1", now)).await.unwrap();
        assert!(matches!(
            store.insert(invoice(a, "INV-1", now)).await,
            Err(DomainError::Conflict(_))
        ));
        store.insert(invoice(b, "INV-1", now)).await.unwrap();
    }

    #[tokio::test]
    async fn listing_is_tenant_scoped_and_newest_first() {
        let store = InMemoryInvoiceStore::new();
        let (a, b) = (TenantId::new(), TenantId::new());
        let now = Utc::now();

        store.insert(invoice(a, "old", now - Duration::hours(1))).await.unwrap();
        store.insert(invoice(b, "other", now)).await.unwrap();
        store.insert(invoice(a, "new", now)).await.unwrap();

        let numbers: Vec<_> = store
            .list_by_tenant(a)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.invoice_number)
            .collect();
        assert_eq!(numbers, ["new", "old"]);
    }

    #[tokio::test]
    async fn status_update_is_tenant_scoped() {
        let store = InMemoryInvoiceStore::new();
        let a = TenantId::new();
        let inv = invoice(a, "INV-1", Utc::now());
        let id = inv.id;
        store.insert(inv).await.unwrap();

        let later = Utc::now() + Duration::minutes(1);
        assert_eq!(
            store
                .update_status(id, TenantId::new(), InvoiceStatus::Pending, InvoiceStatus::Extracted, later)
                .await,
            Err(DomainError::NotFound)
        );

        store
            .update_status(id, a, InvoiceStatus::Pending, InvoiceStatus::Extracted, later)
            .await
            .unwrap();
        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Extracted);
        assert_eq!(stored.updated_at, later);
    }

    #[tokio::test]
    async fn status_update_from_a_stale_status_is_a_conflict() {
        let store = InMemoryInvoiceStore::new();
        let tenant = TenantId::new();
        let created = Utc::now();
        let inv = invoice(tenant, "INV-1", created);
        let id = inv.id;
        store.insert(inv).await.unwrap();

        let later = created + Duration::minutes(1);
        store
            .update_status(id, tenant, InvoiceStatus::Pending, InvoiceStatus::Rejected, later)
            .await
            .unwrap();

        let err = store
            .update_status(id, tenant, InvoiceStatus::Pending, InvoiceStatus::Extracted, later)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Rejected);
    }
}

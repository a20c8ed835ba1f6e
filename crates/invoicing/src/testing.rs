//! In-crate fakes for service tests.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use invoicehub_auth::Identity;
use invoicehub_core::{DomainError, DomainResult, InvoiceId, TenantId, UserId};

use crate::{
    ExtractionClient, ExtractionRequest, Invoice, InvoiceRepository, InvoiceStatus, NewInvoice, NewLineItem,
    RawExtractionResponse,
};

pub(crate) fn caller_in(tenant: TenantId) -> Identity {
    Identity::new(UserId::new(), tenant, "alice")
}

pub(crate) fn new_invoice(number: &str) -> NewInvoice {
    NewInvoice {
        invoice_number: number.to_string(),
        vendor_name: "Widgets Ltd".to_string(),
        invoice_date: NaiveDate::from_ymd_opt(2025, 11, 28),
        total_amount: Decimal::new(15000, 2),
        line_items: vec![NewLineItem {
            description: "Widget".to_string(),
            quantity: Decimal::ONE,
            unit_price: Decimal::new(15000, 2),
            amount: Decimal::new(15000, 2),
        }],
        ..NewInvoice::default()
    }
}

pub(crate) fn extraction_body(number: &str) -> Value {
    json!({
        "status": "success",
        "filename": "inv.pdf",
        "s3_key": null,
        "s3_url": null,
        "confidence_score": 0.9,
        "extracted_data": {
            "invoice_number": number,
            "vendor_name": "Widgets Ltd",
            "invoice_date": "2025-11-28",
            "due_date": "2025-12-28T00:00:00+00:00",
            "total_amount": "150.00",
            "line_items": [
                {"description": "Widget", "quantity": 1, "unit_price": "150.00", "amount": "150.00"}
            ]
        }
    })
}

#[derive(Default)]
pub(crate) struct MemoryRepo {
    invoices: Mutex<Vec<Invoice>>,
    stale: Mutex<Option<Invoice>>,
}

impl MemoryRepo {
    /// Make `find_by_id` answer with this snapshot for its id, as a reader
    /// racing a concurrent writer would see it.
    pub(crate) fn serve_stale(&self, invoice: Invoice) {
        *self.stale.lock().unwrap() = Some(invoice);
    }
}

#[async_trait]
impl InvoiceRepository for MemoryRepo {
    async fn insert(&self, invoice: Invoice) -> DomainResult<()> {
        let mut invoices = self.invoices.lock().unwrap();
        if invoices
            .iter()
            .any(|i| i.tenant_id == invoice.tenant_id && i.invoice_number == invoice.invoice_number)
        {
            return Err(DomainError::conflict("duplicate"));
        }
        invoices.push(invoice);
        Ok(())
    }

    async fn find_by_id(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        if let Some(stale) = self.stale.lock().unwrap().clone().filter(|i| i.id == id) {
            return Ok(Some(stale));
        }
        Ok(self.invoices.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_number(&self, tenant_id: TenantId, number: &str) -> DomainResult<Option<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.tenant_id == tenant_id && i.invoice_number == number)
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|i| i.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: InvoiceId,
        tenant_id: TenantId,
        expected: InvoiceStatus,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id && i.tenant_id == tenant_id)
            .ok_or(DomainError::NotFound)?;
        if invoice.status != expected {
            return Err(DomainError::conflict("invoice status changed concurrently"));
        }
        invoice.status = status;
        invoice.updated_at = updated_at;
        Ok(())
    }
}

/// Records every request; answers with a canned body or a canned failure.
pub(crate) struct FakeExtractor {
    answer: Result<Value, u16>,
    requests: Mutex<Vec<ExtractionRequest>>,
    saw_file: Mutex<bool>,
}

impl FakeExtractor {
    pub(crate) fn answering(body: Value) -> Self {
        Self {
            answer: Ok(body),
            requests: Mutex::default(),
            saw_file: Mutex::default(),
        }
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self {
            answer: Err(status),
            requests: Mutex::default(),
            saw_file: Mutex::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn saw_existing_file(&self) -> bool {
        *self.saw_file.lock().unwrap()
    }
}

#[async_trait]
impl ExtractionClient for FakeExtractor {
    async fn extract(&self, request: ExtractionRequest) -> DomainResult<RawExtractionResponse> {
        let path: PathBuf = request.document_path.clone();
        *self.saw_file.lock().unwrap() = path.exists();
        self.requests.lock().unwrap().push(request);

        match &self.answer {
            Ok(body) => serde_json::from_value(body.clone())
                .map_err(|e| DomainError::upstream(None, format!("invalid response body: {e}"))),
            Err(status) => Err(DomainError::upstream(Some(*status), "extraction service returned an error")),
        }
    }
}

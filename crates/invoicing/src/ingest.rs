//! Document upload -> extraction -> invoice.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tempfile::NamedTempFile;

use invoicehub_auth::{Identity, authorize_tenant};
use invoicehub_core::{DomainError, DomainResult, TenantId};

use crate::{ExtractionRequest, ExtractionResult, Invoice, InvoiceService, InvoiceStatus};

const DEFAULT_FILENAME: &str = "invoice.pdf";
const DEFAULT_EXTENSION: &str = "pdf";

/// An uploaded document as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl InvoiceService {
    /// Run a document through the extraction service and persist the result
    /// as an `EXTRACTED` invoice.
    ///
    /// The document is staged in a temporary file for the duration of the
    /// call; the file is gone when this returns, whatever the outcome.
    pub async fn ingest_document(
        &self,
        caller: &Identity,
        tenant_id: TenantId,
        document: UploadedDocument,
    ) -> DomainResult<Invoice> {
        authorize_tenant(tenant_id, caller)?;

        if document.bytes.is_empty() {
            return Err(DomainError::validation("uploaded document is empty"));
        }

        let filename = document
            .filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();

        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %caller.user_id(),
            filename = %filename,
            size = document.bytes.len(),
            "ingesting document"
        );

        let staged = StagedDocument::stage(filename.clone(), document.bytes).await?;
        let outcome = self.extract_and_store(tenant_id, &filename, staged.path()).await;
        staged.discard();

        match &outcome {
            Ok(invoice) => tracing::info!(
                invoice_id = %invoice.id,
                tenant_id = %tenant_id,
                invoice_number = %invoice.invoice_number,
                line_items = invoice.line_items.len(),
                "document ingested"
            ),
            Err(DomainError::Upstream { status, message }) => tracing::warn!(
                tenant_id = %tenant_id,
                filename = %filename,
                upstream_status = ?status,
                error = %message,
                "extraction failed"
            ),
            Err(e) => tracing::info!(tenant_id = %tenant_id, filename = %filename, error = %e, "ingestion rejected"),
        }

        outcome
    }

    async fn extract_and_store(&self, tenant_id: TenantId, filename: &str, path: &Path) -> DomainResult<Invoice> {
        let raw = self
            .extractor
            .extract(ExtractionRequest {
                document_path: path.to_path_buf(),
                filename: filename.to_string(),
                tenant_id,
            })
            .await?;

        if let Some(method) = raw.extraction_method.as_deref() {
            tracing::debug!(tenant_id = %tenant_id, method, "extraction response received");
        }

        let result = ExtractionResult::try_from(raw)?;
        let invoice = Invoice::create(tenant_id, result.into_new_invoice(), InvoiceStatus::Extracted, Utc::now())?;
        self.persist_new(invoice).await
    }
}

/// Uploaded bytes on local disk.
///
/// Removed by [`StagedDocument::discard`], or on drop if that never runs.
struct StagedDocument {
    file: NamedTempFile,
}

impl StagedDocument {
    /// Writes on the blocking pool so large uploads don't stall a runtime worker.
    async fn stage(filename: String, bytes: Vec<u8>) -> DomainResult<Self> {
        tokio::task::spawn_blocking(move || Self::write(&filename, &bytes))
            .await
            .map_err(|e| DomainError::storage(format!("stage document: {e}")))?
    }

    fn write(filename: &str, bytes: &[u8]) -> DomainResult<Self> {
        let suffix = format!(".{}", extension(filename));
        let mut file = tempfile::Builder::new()
            .prefix("invoice_")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| DomainError::storage(format!("create temp file: {e}")))?;

        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| DomainError::storage(format!("write temp file: {e}")))?;

        Ok(Self { file })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged document");
        }
    }
}

/// Extension of `filename`, if it is short and alphanumeric.
fn extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeExtractor, MemoryRepo, caller_in, extraction_body};
    use std::sync::Arc;

    fn service(extractor: FakeExtractor) -> (InvoiceService, Arc<FakeExtractor>) {
        let extractor = Arc::new(extractor);
        let svc = InvoiceService::new(Arc::new(MemoryRepo::default()), extractor.clone());
        (svc, extractor)
    }

    fn upload(name: &str) -> UploadedDocument {
        UploadedDocument {
            filename: Some(name.to_string()),
            bytes: b"%PDF-1.4 fake".to_vec(),
        }
    }

    #[tokio::test]
    async fn ingested_invoice_is_extracted_and_normalized() {
        let (svc, extractor) = service(FakeExtractor::answering(extraction_body("INV-001")));
        let tenant = TenantId::new();

        let invoice = svc.ingest_document(&caller_in(tenant), tenant, upload("inv.pdf")).await.unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Extracted);
        assert_eq!(invoice.total_amount.to_string(), "150.00");
        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.due_date.map(|d| d.to_string()).as_deref(), Some("2025-12-28"));
        assert_eq!(invoice.line_items.len(), 1);

        let seen = extractor.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tenant_id, tenant);
        assert_eq!(seen[0].filename, "inv.pdf");
    }

    #[tokio::test]
    async fn staged_file_is_removed_on_success_and_failure() {
        let tenant = TenantId::new();

        let (svc, extractor) = service(FakeExtractor::answering(extraction_body("INV-001")));
        svc.ingest_document(&caller_in(tenant), tenant, upload("inv.pdf")).await.unwrap();
        let path = extractor.requests()[0].document_path.clone();
        assert!(extractor.saw_existing_file());
        assert!(!path.exists());

        let (svc, extractor) = service(FakeExtractor::failing(503));
        let err = svc.ingest_document(&caller_in(tenant), tenant, upload("inv.pdf")).await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream { status: Some(503), .. }));
        assert!(!extractor.requests()[0].document_path.exists());
    }

    #[tokio::test]
    async fn staged_document_holds_the_uploaded_bytes() {
        let bytes = vec![0x25; 256 * 1024];
        let staged = StagedDocument::stage("scan.PNG".to_string(), bytes.clone()).await.unwrap();

        assert_eq!(std::fs::read(staged.path()).unwrap(), bytes);
        assert!(staged.path().to_string_lossy().ends_with(".PNG"));

        let path = staged.path().to_path_buf();
        staged.discard();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn empty_document_never_reaches_the_extractor() {
        let (svc, extractor) = service(FakeExtractor::answering(extraction_body("INV-001")));
        let tenant = TenantId::new();
        let empty = UploadedDocument {
            filename: Some("empty.pdf".to_string()),
            bytes: Vec::new(),
        };

        let err = svc.ingest_document(&caller_in(tenant), tenant, empty).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(extractor.requests().is_empty());
    }

    #[tokio::test]
    async fn foreign_tenant_never_reaches_the_extractor() {
        let (svc, extractor) = service(FakeExtractor::answering(extraction_body("INV-001")));
        let err = svc
            .ingest_document(&caller_in(TenantId::new()), TenantId::new(), upload("inv.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert!(extractor.requests().is_empty());
    }

    #[tokio::test]
    async fn second_upload_of_same_number_conflicts() {
        let (svc, _) = service(FakeExtractor::answering(extraction_body("INV-001")));
        let tenant = TenantId::new();
        let caller = caller_in(tenant);

        svc.ingest_document(&caller, tenant, upload("a.pdf")).await.unwrap();
        let err = svc.ingest_document(&caller, tenant, upload("b.pdf")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn extension_falls_back_to_pdf() {
        assert_eq!(extension("scan.PNG"), "PNG");
        assert_eq!(extension("no-extension"), "pdf");
        assert_eq!(extension("weird.ext with space"), "pdf");
        assert_eq!(extension("../../etc/passwd"), "pdf");
    }
}

use std::path::PathBuf;

use async_trait::async_trait;

use invoicehub_core::{DomainResult, TenantId};

use crate::RawExtractionResponse;

/// A staged document to submit for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Local file holding the document bytes.
    pub document_path: PathBuf,
    /// Name reported to the extraction service.
    pub filename: String,
    pub tenant_id: TenantId,
}

/// Client of the external extraction service.
///
/// Non-success responses map to `DomainError::Upstream` carrying the
/// service's status code; transport failures and undecodable bodies map to
/// `DomainError::Upstream` without one.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract(&self, request: ExtractionRequest) -> DomainResult<RawExtractionResponse>;
}

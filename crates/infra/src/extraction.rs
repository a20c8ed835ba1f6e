//! HTTP client for the document extraction service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use invoicehub_core::{DomainError, DomainResult};
use invoicehub_invoicing::{ExtractionClient, ExtractionRequest, RawExtractionResponse};

/// Default bound on a single extraction call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Talks to `POST {base_url}/extract-invoice` with a multipart body of
/// `file` + `tenant_id`.
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExtractionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::storage(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/extract-invoice", self.base_url)
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn extract(&self, request: ExtractionRequest) -> DomainResult<RawExtractionResponse> {
        let bytes = tokio::fs::read(&request.document_path)
            .await
            .map_err(|e| DomainError::storage(format!("read staged document: {e}")))?;

        let file_part = Part::bytes(bytes).file_name(request.filename.clone());
        let form = Form::new()
            .part("file", file_part)
            .text("tenant_id", request.tenant_id.to_string());

        let url = self.endpoint();
        tracing::debug!(url = %url, tenant_id = %request.tenant_id, filename = %request.filename, "calling extraction service");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "request failed" };
                DomainError::upstream(None, format!("extraction service {reason}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %truncate(&body, 512), "extraction service returned an error");
            return Err(DomainError::upstream(
                Some(status.as_u16()),
                format!("extraction service returned {status}"),
            ));
        }

        response
            .json::<RawExtractionResponse>()
            .await
            .map_err(|e| DomainError::upstream(None, format!("invalid extraction response: {e}")))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

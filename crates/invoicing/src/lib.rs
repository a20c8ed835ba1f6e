//! Invoicing domain: the invoice model and its lifecycle, normalization of
//! extraction-service payloads, and the ingestion pipeline that ties them
//! together.
//!
//! Storage and the extraction service are reached through
//! [`InvoiceRepository`] and [`ExtractionClient`]; concrete implementations
//! live in `invoicehub-infra`.

pub mod extraction;
pub mod extractor;
pub mod ingest;
pub mod invoice;
pub mod money;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

pub use extraction::{ExtractedLineItem, ExtractionResult, RawExtractedData, RawExtractionResponse, RawLineItem};
pub use extractor::{ExtractionClient, ExtractionRequest};
pub use ingest::UploadedDocument;
pub use invoice::{Invoice, InvoiceLineItem, InvoiceStatus, NewInvoice, NewLineItem};
pub use repository::InvoiceRepository;
pub use service::InvoiceService;

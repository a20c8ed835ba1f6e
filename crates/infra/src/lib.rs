//! Infrastructure layer: store implementations and external service clients.

pub mod extraction;
pub mod memory;
pub mod postgres;

pub use extraction::HttpExtractionClient;
pub use memory::{InMemoryCredentialStore, InMemoryInvoiceStore};
pub use postgres::{PostgresCredentialStore, PostgresInvoiceStore};

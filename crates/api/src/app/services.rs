use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use invoicehub_auth::{AuthService, CredentialStore};
use invoicehub_core::DomainError;
use invoicehub_infra::{
    HttpExtractionClient, InMemoryCredentialStore, InMemoryInvoiceStore, PostgresCredentialStore,
    PostgresInvoiceStore,
};
use invoicehub_invoicing::{ExtractionClient, InvoiceRepository, InvoiceService};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to Postgres: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to build extraction client: {0}")]
    Extraction(DomainError),
}

#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub invoices: InvoiceService,
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let extractor: Arc<dyn ExtractionClient> = Arc::new(
        HttpExtractionClient::new(&config.extraction_url, config.extraction_timeout)
            .map_err(StartupError::Extraction)?,
    );

    let (credentials, invoices): (Arc<dyn CredentialStore>, Arc<dyn InvoiceRepository>) =
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = PgPool::connect(url).await?;
                tracing::info!("using Postgres stores");
                (
                    Arc::new(PostgresCredentialStore::new(pool.clone())),
                    Arc::new(PostgresInvoiceStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL is not set; data lives in memory and is lost on restart");
                (
                    Arc::new(InMemoryCredentialStore::new()),
                    Arc::new(InMemoryInvoiceStore::new()),
                )
            }
        };

    tracing::info!(
        extraction_url = %config.extraction_url,
        timeout_secs = config.extraction_timeout.as_secs(),
        "extraction client configured"
    );

    Ok(AppServices {
        auth: AuthService::new(credentials, config.auth.clone()),
        invoices: InvoiceService::new(invoices, extractor),
    })
}

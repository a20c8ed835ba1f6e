use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Extension, Multipart, OriginalUri, Path,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use invoicehub_auth::Identity;
use invoicehub_core::InvoiceId;
use invoicehub_invoicing::{InvoiceStatus, UploadedDocument};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{TENANT_PARAM, TenantContext, query_param, tenant_from_query};

pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/upload",
            post(upload_invoice).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/:id", get(get_invoice))
        .route("/:id/status", put(update_invoice_status))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = services
        .invoices
        .list_invoices(&identity, tenant.tenant_id())
        .await?;

    Ok(Json(invoices.iter().map(dto::invoice_to_json).collect::<Vec<_>>()))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    tenant: TenantContext,
    body: Result<Json<dto::CreateInvoiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let new = body.into_new_invoice()?;

    let invoice = services
        .invoices
        .create_invoice(&identity, tenant.tenant_id(), new)
        .await?;

    Ok((StatusCode::CREATED, Json(dto::invoice_to_json(&invoice))))
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice_id: InvoiceId = id.parse()?;

    let invoice = services
        .invoices
        .get_invoice(&identity, tenant.tenant_id(), invoice_id)
        .await?;

    Ok(Json(dto::invoice_to_json(&invoice)))
}

pub async fn update_invoice_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    tenant: TenantContext,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice_id: InvoiceId = id.parse()?;
    let status: InvoiceStatus = query_param(&uri, "status")?
        .ok_or_else(|| ApiError::missing_parameter("status"))?
        .parse()?;

    let invoice = services
        .invoices
        .update_status(&identity, tenant.tenant_id(), invoice_id, status)
        .await?;

    Ok(Json(dto::invoice_to_json(&invoice)))
}

/// Multipart upload: a `file` part plus an optional `tenantId` field, used
/// when the query string does not carry one.
pub async fn upload_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    OriginalUri(uri): OriginalUri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart?;
    let mut tenant_id = tenant_from_query(&uri)?;
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                document = Some(UploadedDocument {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            Some(TENANT_PARAM) if tenant_id.is_none() => {
                let raw = field.text().await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    tenant_id = Some(raw.parse()?);
                }
            }
            _ => {}
        }
    }

    let tenant_id = tenant_id.ok_or_else(|| ApiError::missing_parameter(TENANT_PARAM))?;
    let document = document.ok_or_else(|| ApiError::bad_request("Required part 'file' is missing"))?;

    let invoice = services
        .invoices
        .ingest_document(&identity, tenant_id, document)
        .await?;

    Ok((StatusCode::CREATED, Json(dto::invoice_to_json(&invoice))))
}

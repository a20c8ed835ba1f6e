use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::Uri;
use axum::http::request::Parts;

use invoicehub_core::TenantId;

use crate::app::errors::ApiError;

pub const TENANT_PARAM: &str = "tenantId";

/// Tenant named by the `tenantId` query parameter.
///
/// This is the tenant the caller *asks* for; it is checked against the
/// caller's identity by the invoicing service, never trusted on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        tenant_from_query(&parts.uri)?
            .map(TenantContext::new)
            .ok_or_else(|| ApiError::missing_parameter(TENANT_PARAM))
    }
}

/// Read a named query parameter, treating blank values as absent.
pub fn query_param(uri: &Uri, name: &str) -> Result<Option<String>, ApiError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|e| ApiError::bad_request(e.body_text()))?;

    Ok(params
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

pub fn tenant_from_query(uri: &Uri) -> Result<Option<TenantId>, ApiError> {
    query_param(uri, TENANT_PARAM)?
        .map(|raw| raw.parse::<TenantId>().map_err(ApiError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_is_read_from_the_query_string() {
        let tenant = TenantId::new();
        let uri: Uri = format!("/api/invoices?tenantId={tenant}").parse().unwrap();
        assert_eq!(tenant_from_query(&uri).unwrap(), Some(tenant));
    }

    #[test]
    fn blank_and_missing_tenant_are_absent() {
        let uri: Uri = "/api/invoices?tenantId=".parse().unwrap();
        assert_eq!(tenant_from_query(&uri).unwrap(), None);

        let uri: Uri = "/api/invoices".parse().unwrap();
        assert_eq!(tenant_from_query(&uri).unwrap(), None);
    }

    #[test]
    fn malformed_tenant_is_a_bad_request() {
        let uri: Uri = "/api/invoices?tenantId=acme".parse().unwrap();
        let err = tenant_from_query(&uri).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}

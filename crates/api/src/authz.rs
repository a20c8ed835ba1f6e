//! Route-level authentication gate.
//!
//! The identity middleware never rejects; routes that need a caller sit
//! behind [`require_identity`].

use axum::{middleware::Next, response::Response};

use invoicehub_auth::Identity;

use crate::app::errors::ApiError;

pub async fn require_identity(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if req.extensions().get::<Identity>().is_none() {
        tracing::debug!(path = %req.uri().path(), "rejecting anonymous request");
        return Err(ApiError::unauthorized("Authentication required"));
    }

    Ok(next.run(req).await)
}

use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod invoices;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

/// Endpoints that need an authenticated caller.
pub fn protected_router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .nest("/api/invoices", invoices::router(max_upload_bytes))
        .route_layer(axum::middleware::from_fn(crate::authz::require_identity))
}

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use invoicehub_auth::{AuthSession, Identity};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::app::{cookies, dto};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let session = services.auth.register(body.into()).await?;
    Ok(session_response(&services, &headers, StatusCode::CREATED, session, "Registration successful"))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let session = services.auth.login(body.into()).await?;
    Ok(session_response(&services, &headers, StatusCode::OK, session, "Login successful"))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Response {
    tracing::info!(user_id = %identity.user_id(), tenant_id = %identity.tenant_id(), "logout");

    let body = Json(serde_json::json!({ "message": "Logout successful" }));
    match cookies::clear_cookie(services.auth.config(), &headers) {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
        None => body.into_response(),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = services.auth.current_user(&identity).await?;
    Ok(Json(dto::profile_to_json(&profile)))
}

fn session_response(
    services: &AppServices,
    headers: &HeaderMap,
    status: StatusCode,
    session: AuthSession,
    message: &str,
) -> Response {
    let body = Json(dto::auth_response_to_json(&session.profile, Some(&session.token), message));
    match cookies::auth_cookie(services.auth.config(), &session.token, headers) {
        Some(cookie) => (status, [(header::SET_COOKIE, cookie)], body).into_response(),
        None => (status, body).into_response(),
    }
}

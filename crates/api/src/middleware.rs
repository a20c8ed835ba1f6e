use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use invoicehub_auth::TokenService;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    pub cookie_name: String,
}

/// Resolve the caller's [`Identity`](invoicehub_auth::Identity) and attach
/// it to the request.
///
/// The auth cookie wins over the `Authorization` header: when the cookie is
/// present its token is the only one considered. A missing or invalid token
/// leaves the request anonymous; rejecting it is up to the route.
pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_cookie(req.headers(), &state.cookie_name) {
        Some(token) => Some(token),
        None => extract_bearer(req.headers()),
    };

    if let Some(identity) = token.and_then(|t| state.tokens.authenticate(&t)) {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; access_token=abc.def; lang=en"));
        assert_eq!(extract_cookie(&headers, "access_token").as_deref(), Some("abc.def"));
        assert_eq!(extract_cookie(&headers, "session"), None);
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(extract_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn bearer_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("tok"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }
}

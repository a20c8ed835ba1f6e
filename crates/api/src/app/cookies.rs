//! `Set-Cookie` values for the auth cookie.

use axum::http::{HeaderMap, HeaderValue};

use invoicehub_auth::AuthConfig;

pub fn auth_cookie(config: &AuthConfig, token: &str, request_headers: &HeaderMap) -> Option<HeaderValue> {
    let max_age = config.token_ttl.num_seconds().max(0);
    build(config, token, max_age, request_headers)
}

pub fn clear_cookie(config: &AuthConfig, request_headers: &HeaderMap) -> Option<HeaderValue> {
    build(config, "", 0, request_headers)
}

fn build(config: &AuthConfig, value: &str, max_age: i64, request_headers: &HeaderMap) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        config.cookie_name, value, max_age
    );
    if config.cookie_secure || behind_https(request_headers) {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

fn behind_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lives_as_long_as_the_token() {
        let config = AuthConfig::new(b"secret".to_vec());
        let cookie = auth_cookie(&config, "tok", &HeaderMap::new()).unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("access_token=tok;"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn forwarded_https_marks_the_cookie_secure() {
        let config = AuthConfig::new(b"secret".to_vec());
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let cookie = auth_cookie(&config, "tok", &headers).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clearing_expires_immediately() {
        let config = AuthConfig::new(b"secret".to_vec());
        let cookie = clear_cookie(&config, &HeaderMap::new()).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("access_token=; Path=/; Max-Age=0;"));
    }
}

//! Authentication configuration.

use chrono::Duration;

/// Default identity-token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Default name of the cookie carrying the identity token.
pub const DEFAULT_COOKIE_NAME: &str = "access_token";

/// Configuration for token issuance and the cookie transport.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret; the sole trust anchor for identity tokens.
    pub jwt_secret: Vec<u8>,
    /// Token lifetime. The auth cookie's `Max-Age` matches it.
    pub token_ttl: Duration,
    /// Name of the cookie carrying the token.
    pub cookie_name: String,
    /// Force the `Secure` cookie attribute regardless of transport.
    pub cookie_secure: bool,
    /// Minimum accepted password length at registration.
    pub min_password_length: usize,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: false,
            min_password_length: 8,
        }
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

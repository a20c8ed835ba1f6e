//! Process configuration, read from the environment.
//!
//! | variable | default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | development secret (logged as a warning) |
//! | `TOKEN_TTL_SECS` | `86400` (at most one year) |
//! | `AUTH_COOKIE_NAME` | `access_token` |
//! | `COOKIE_SECURE` | `false` |
//! | `EXTRACTION_URL` | `http://localhost:8001` |
//! | `EXTRACTION_TIMEOUT_SECS` | `120` |
//! | `MAX_UPLOAD_BYTES` | `20971520` |
//! | `DATABASE_URL` | unset (in-memory stores) |
//! | `CORS_ALLOWED_ORIGINS` | `http://localhost:5173,http://localhost:3000` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use invoicehub_auth::AuthConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_EXTRACTION_URL: &str = "http://localhost:8001";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
/// One year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

const DEV_JWT_SECRET: &str = "invoicehub-development-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}' ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub extraction_url: String,
    pub extraction_timeout: Duration,
    pub max_upload_bytes: usize,
    /// When unset the API runs on in-memory stores.
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or("BIND_ADDR", var("BIND_ADDR"), || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| e.to_string())
        })?;

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET is not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let mut auth = AuthConfig::new(jwt_secret.into_bytes());
        if let Some(secs) = parse_opt::<i64>("TOKEN_TTL_SECS", var("TOKEN_TTL_SECS"))? {
            if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
                return Err(invalid(
                    "TOKEN_TTL_SECS",
                    secs.to_string(),
                    format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
                ));
            }
            auth.token_ttl = chrono::Duration::try_seconds(secs)
                .ok_or_else(|| invalid("TOKEN_TTL_SECS", secs.to_string(), "out of range"))?;
        }
        if let Some(name) = var("AUTH_COOKIE_NAME") {
            auth.cookie_name = name;
        }
        if let Some(secure) = parse_opt::<bool>("COOKIE_SECURE", var("COOKIE_SECURE"))? {
            auth.cookie_secure = secure;
        }

        let extraction_url = var("EXTRACTION_URL").unwrap_or_else(|| DEFAULT_EXTRACTION_URL.to_string());

        let extraction_timeout = parse_opt::<u64>("EXTRACTION_TIMEOUT_SECS", var("EXTRACTION_TIMEOUT_SECS"))?
            .map(Duration::from_secs)
            .unwrap_or(invoicehub_infra::extraction::DEFAULT_TIMEOUT);

        let max_upload_bytes =
            parse_opt::<usize>("MAX_UPLOAD_BYTES", var("MAX_UPLOAD_BYTES"))?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            bind_addr,
            auth,
            extraction_url,
            extraction_timeout,
            max_upload_bytes,
            database_url: var("DATABASE_URL"),
            cors_allowed_origins,
        })
    }
}

fn invalid(name: &'static str, value: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.into(),
        reason: reason.into(),
    }
}

fn parse_opt<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| value.parse::<T>().map_err(|e| invalid(name, value.clone(), e.to_string())))
        .transpose()
}

fn parse_or<T>(
    name: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> Result<T, String>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match parse_opt(name, raw)? {
        Some(value) => Ok(value),
        None => default().map_err(|reason| invalid(name, "<default>", reason)),
    }
}

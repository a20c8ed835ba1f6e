//! `invoicehub-auth`: authentication and tenant authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and from any concrete
//! storage engine: credentials are reached through [`CredentialStore`], and
//! the request layer only ever sees a verified [`Identity`].

pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod password;
pub mod service;
pub mod store;
pub mod tenant;
pub mod token;
pub mod user;

pub use claims::{IdentityClaims, TokenValidationError, validate_claims};
pub use config::AuthConfig;
pub use error::AuthError;
pub use guard::{AuthzError, assert_tenant_match, authorize_tenant};
pub use identity::Identity;
pub use service::{AuthService, AuthSession, Credentials, Registration};
pub use store::CredentialStore;
pub use tenant::Tenant;
pub use token::TokenService;
pub use user::{User, UserProfile};

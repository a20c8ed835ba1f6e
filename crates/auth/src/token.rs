//! Identity token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use invoicehub_core::{TenantId, UserId};

use crate::claims::{IdentityClaims, validate_claims};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::Identity;

/// Stateless issuer/verifier of identity tokens.
///
/// Holds nothing but the shared secret and the token lifetime, so any number
/// of instances can verify each other's tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for the given identity, valid for `ttl` from now.
    pub fn issue(&self, username: &str, user_id: UserId, tenant_id: TenantId) -> Result<String, AuthError> {
        self.issue_at(username, user_id, tenant_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        user_id: UserId,
        tenant_id: TenantId,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Crypto(format!("token lifetime {} is out of range", self.ttl)))?;
        let claims = IdentityClaims {
            sub: username.to_string(),
            user_id,
            tenant_id,
            iat: now,
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// `true` when the signature checks out and the token has not expired.
    ///
    /// Never fails: malformed, unsigned, foreign or expired tokens are simply
    /// not valid.
    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.authenticate_at(token, now).is_some()
    }

    /// Decode the identity claims of a token.
    ///
    /// The signature is still checked, but the time window is not: call
    /// [`TokenService::verify`] first.
    pub fn extract_identity(&self, token: &str) -> Result<Identity, AuthError> {
        self.decode(token).map(Identity::from)
    }

    /// Verify and decode in one step.
    pub fn authenticate(&self, token: &str) -> Option<Identity> {
        self.authenticate_at(token, Utc::now())
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Option<Identity> {
        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "rejecting identity token");
                return None;
            }
        };

        if let Err(e) = validate_claims(&claims, now) {
            tracing::debug!(error = %e, user_id = %claims.user_id, "rejecting identity token");
            return None;
        }

        Some(Identity::from(claims))
    }

    fn decode(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        // The time window is checked by `validate_claims` so callers can
        // inject `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

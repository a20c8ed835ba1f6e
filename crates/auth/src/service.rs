//! Registration, login and "who am I" on top of a [`CredentialStore`].

use std::sync::Arc;

use chrono::Utc;

use invoicehub_core::{DomainError, DomainResult};

use crate::password::{hash_password, verify_password};
use crate::{AuthConfig, AuthError, CredentialStore, Identity, Tenant, TokenService, User, UserProfile};

/// New tenant plus its first user.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tenant_name: String,
    pub tenant_slug: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// When present, the user must belong to this tenant.
    pub tenant_slug: Option<String>,
}

/// A freshly issued token and the profile it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub profile: UserProfile,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        Self {
            store,
            tokens: TokenService::from_config(&config),
            config,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn register(&self, req: Registration) -> DomainResult<AuthSession> {
        let username = req.username.trim();
        let email = req.email.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation("email address is invalid"));
        }
        if req.password.chars().count() < self.config.min_password_length {
            return Err(DomainError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let now = Utc::now();
        let tenant = Tenant::new(&req.tenant_name, &req.tenant_slug, now)?;

        if self.store.username_taken(username).await? {
            return Err(DomainError::conflict("username already exists"));
        }
        if self.store.email_taken(email).await? {
            return Err(DomainError::conflict("email already exists"));
        }
        if self.store.tenant_slug_taken(&tenant.slug).await? {
            return Err(DomainError::conflict(format!(
                "tenant with slug '{}' already exists",
                tenant.slug
            )));
        }
        if self.store.tenant_name_taken(&tenant.name).await? {
            return Err(DomainError::conflict(format!(
                "tenant with name '{}' already exists",
                tenant.name
            )));
        }

        let user = User {
            id: Default::default(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(&req.password)?,
            first_name: non_blank(req.first_name),
            last_name: non_blank(req.last_name),
            tenant_id: tenant.id,
            active: true,
            created_at: now,
        };

        // The store re-checks uniqueness atomically; the lookups above only
        // produce friendlier messages.
        self.store.register(tenant.clone(), user.clone()).await?;

        tracing::info!(
            user_id = %user.id,
            tenant_id = %tenant.id,
            tenant_slug = %tenant.slug,
            "registered tenant"
        );

        let token = self.tokens.issue(&user.username, user.id, tenant.id)?;
        Ok(AuthSession {
            token,
            profile: profile(&user, &tenant),
        })
    }

    pub async fn login(&self, creds: Credentials) -> DomainResult<AuthSession> {
        let username = creds.username.trim();

        let Some(user) = self.store.find_user_by_username(username).await? else {
            tracing::info!(username, "login failed: unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(&creds.password, &user.password_hash)? {
            tracing::info!(username, user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.active {
            tracing::info!(username, user_id = %user.id, "login failed: inactive account");
            return Err(AuthError::AccountInactive.into());
        }

        let tenant = self
            .store
            .find_tenant_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| DomainError::storage(format!("tenant {} of user {} is missing", user.tenant_id, user.id)))?;

        if let Some(slug) = creds.tenant_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if slug != tenant.slug {
                tracing::info!(username, user_id = %user.id, tenant_slug = slug, "login failed: tenant mismatch");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        if !tenant.active {
            tracing::info!(username, tenant_id = %tenant.id, "login failed: inactive tenant");
            return Err(AuthError::AccountInactive.into());
        }

        let token = self.tokens.issue(&user.username, user.id, tenant.id)?;
        tracing::info!(username, user_id = %user.id, tenant_id = %tenant.id, "login succeeded");

        Ok(AuthSession {
            token,
            profile: profile(&user, &tenant),
        })
    }

    /// Load the profile behind a verified identity.
    pub async fn current_user(&self, identity: &Identity) -> DomainResult<UserProfile> {
        let user = self
            .store
            .find_user_by_id(identity.user_id())
            .await?
            .filter(|u| u.tenant_id == identity.tenant_id())
            .ok_or_else(|| DomainError::unauthenticated("user not found"))?;

        let tenant = self
            .store
            .find_tenant_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| DomainError::unauthenticated("tenant not found"))?;

        Ok(profile(&user, &tenant))
    }
}

impl core::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn profile(user: &User, tenant: &Tenant) -> UserProfile {
    UserProfile {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        tenant_id: tenant.id,
        tenant_name: tenant.name.clone(),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invoicehub_core::{DomainError, DomainResult, TenantId};

/// An organization; the isolation boundary for all invoice data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new, active tenant after validating its name and slug.
    pub fn new(name: &str, slug: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("tenant name cannot be empty"));
        }
        let slug = slug.trim();
        validate_slug(slug)?;

        Ok(Self {
            id: TenantId::new(),
            name: name.to_string(),
            slug: slug.to_string(),
            active: true,
            created_at: now,
        })
    }
}

/// Slugs are lower-case ASCII alphanumerics and hyphens, not starting or
/// ending with a hyphen.
pub fn validate_slug(slug: &str) -> DomainResult<()> {
    if slug.is_empty() {
        return Err(DomainError::validation("tenant slug cannot be empty"));
    }
    let allowed = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !allowed || slug.starts_with('-') || slug.ends_with('-') {
        return Err(DomainError::validation(
            "tenant slug may only contain lower-case letters, digits and hyphens",
        ));
    }
    Ok(())
}

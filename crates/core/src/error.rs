//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Each variant is a distinct *kind* the HTTP boundary maps to a status code
/// deterministically. `NotFound` doubles as the tenant-isolation signal: a
/// resource owned by another tenant is reported exactly like a missing one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, unparsable amount).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Missing, invalid or expired credentials.
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// Resource is missing or belongs to another tenant.
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The extraction collaborator failed or answered with garbage.
    #[error("upstream service error{}: {message}", status_suffix(.status))]
    Upstream { status: Option<u16>, message: String },

    /// Storage collaborator failure. Never shown verbatim to callers.
    #[error("storage error: {0}")]
    Storage(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn upstream(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_embeds_status_when_known() {
        let err = DomainError::upstream(Some(503), "extraction failed");
        assert_eq!(
            err.to_string(),
            "upstream service error (status 503): extraction failed"
        );

        let err = DomainError::upstream(None, "connection refused");
        assert_eq!(err.to_string(), "upstream service error: connection refused");
    }
}

//! Postgres-backed stores.
//!
//! Schema management is external; the stores assume these tables:
//!
//! | table | key | unique |
//! |-------|-----|--------|
//! | `tenants` | `id` | `name`, `slug` |
//! | `users` | `id` | `username`, `email` |
//! | `invoices` | `id` | `(tenant_id, invoice_number)` |
//! | `invoice_line_items` | `(invoice_id, position)` | |
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | anything else | | `Storage` |

mod credentials;
mod invoices;

pub use credentials::PostgresCredentialStore;
pub use invoices::PostgresInvoiceStore;

use invoicehub_core::DomainError;

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    if is_unique_violation(&err) {
        let constraint = match &err {
            sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or("unique").to_string(),
            _ => "unique".to_string(),
        };
        return DomainError::conflict(format!("{operation}: duplicate value violates '{constraint}'"));
    }
    DomainError::storage(format!("{operation}: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

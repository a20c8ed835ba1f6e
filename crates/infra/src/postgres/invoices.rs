use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use invoicehub_core::{DomainError, DomainResult, InvoiceId, TenantId};
use invoicehub_invoicing::{Invoice, InvoiceLineItem, InvoiceRepository, InvoiceStatus};

use super::map_sqlx_error;

const INVOICE_COLUMNS: &str = r#"
    id, tenant_id, invoice_number, vendor_name, invoice_date, due_date,
    total_amount, currency, status, tax_amount, shipping_amount, payment_terms,
    document_key, document_url, source_filename, confidence_score,
    created_at, updated_at
"#;

/// Invoices and their line items in Postgres.
///
/// An invoice and its line items are always written in one transaction.
#[derive(Debug, Clone)]
pub struct PostgresInvoiceStore {
    pool: Arc<PgPool>,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Attach line items (ordered by position) to already-loaded invoice rows.
    async fn with_line_items(&self, rows: Vec<PgRow>) -> DomainResult<Vec<Invoice>> {
        let mut invoices = rows
            .iter()
            .map(invoice_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_invoice", e))?;
        if invoices.is_empty() {
            return Ok(invoices);
        }

        let ids: Vec<Uuid> = invoices.iter().map(|i| *i.id.as_uuid()).collect();
        let item_rows = sqlx::query(
            r#"
            SELECT invoice_id, position, description, quantity, unit_price, amount
            FROM invoice_line_items
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, position ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_line_items", e))?;

        let mut items: HashMap<Uuid, Vec<InvoiceLineItem>> = HashMap::new();
        for row in &item_rows {
            let invoice_id: Uuid = row
                .try_get("invoice_id")
                .map_err(|e| map_sqlx_error("decode_line_item", e))?;
            let item = line_item_from_row(row).map_err(|e| map_sqlx_error("decode_line_item", e))?;
            items.entry(invoice_id).or_default().push(item);
        }

        for invoice in &mut invoices {
            invoice.line_items = items.remove(invoice.id.as_uuid()).unwrap_or_default();
        }
        Ok(invoices)
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceStore {
    #[instrument(
        skip_all,
        fields(invoice_id = %invoice.id, tenant_id = %invoice.tenant_id, line_items = invoice.line_items.len()),
        err
    )]
    async fn insert(&self, invoice: Invoice) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, tenant_id, invoice_number, vendor_name, invoice_date, due_date,
                total_amount, currency, status, tax_amount, shipping_amount, payment_terms,
                document_key, document_url, source_filename, confidence_score,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.tenant_id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(&invoice.vendor_name)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.total_amount)
        .bind(&invoice.currency)
        .bind(invoice.status.as_str())
        .bind(invoice.tax_amount)
        .bind(invoice.shipping_amount)
        .bind(&invoice.payment_terms)
        .bind(&invoice.document_key)
        .bind(&invoice.document_url)
        .bind(&invoice.source_filename)
        .bind(invoice.confidence_score)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice", e))?;

        for item in &invoice.line_items {
            sqlx::query(
                r#"
                INSERT INTO invoice_line_items (
                    invoice_id, position, description, quantity, unit_price, amount
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(invoice.id.as_uuid())
            .bind(position_column(item.position)?)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_line_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn find_by_id(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_invoice_by_id", e))?;

        Ok(self.with_line_items(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_number(&self, tenant_id: TenantId, invoice_number: &str) -> DomainResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE tenant_id = $1 AND invoice_number = $2");
        let row = sqlx::query(&sql)
            .bind(tenant_id.as_uuid())
            .bind(invoice_number)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_invoice_by_number", e))?;

        Ok(self.with_line_items(row.into_iter().collect()).await?.pop())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE tenant_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(tenant_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_invoices", e))?;

        self.with_line_items(rows).await
    }

    #[instrument(skip(self), fields(invoice_id = %id, tenant_id = %tenant_id), err)]
    async fn update_status(
        &self,
        id: InvoiceId,
        tenant_id: TenantId,
        expected: InvoiceStatus,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = $3, updated_at = $4
            WHERE id = $1 AND tenant_id = $2 AND status = $5
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(status.as_str())
        .bind(updated_at)
        .bind(expected.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_invoice_status", e))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM invoices WHERE id = $1 AND tenant_id = $2")
                .bind(id.as_uuid())
                .bind(tenant_id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("update_invoice_status", e))?;
            return Err(match exists {
                Some(_) => DomainError::conflict("invoice status changed concurrently"),
                None => DomainError::not_found(),
            });
        }
        Ok(())
    }
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<InvoiceStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get("id")?),
        tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
        invoice_number: row.try_get("invoice_number")?,
        vendor_name: row.try_get("vendor_name")?,
        invoice_date: row.try_get("invoice_date")?,
        due_date: row.try_get("due_date")?,
        total_amount: row.try_get("total_amount")?,
        currency: row.try_get("currency")?,
        status,
        tax_amount: row.try_get("tax_amount")?,
        shipping_amount: row.try_get("shipping_amount")?,
        payment_terms: row.try_get("payment_terms")?,
        document_key: row.try_get("document_key")?,
        document_url: row.try_get("document_url")?,
        source_filename: row.try_get("source_filename")?,
        confidence_score: row.try_get("confidence_score")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        line_items: Vec::new(),
    })
}

fn line_item_from_row(row: &PgRow) -> Result<InvoiceLineItem, sqlx::Error> {
    let position: i32 = row.try_get("position")?;
    Ok(InvoiceLineItem {
        position: u32::try_from(position).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        amount: row.try_get("amount")?,
    })
}

/// `position` is an `INTEGER` column.
fn position_column(position: u32) -> DomainResult<i32> {
    i32::try_from(position).map_err(|_| DomainError::storage(format!("line item position {position} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_beyond_integer_column_is_a_storage_error() {
        assert_eq!(position_column(7), Ok(7));
        assert_eq!(position_column(i32::MAX as u32), Ok(i32::MAX));
        assert!(matches!(
            position_column(i32::MAX as u32 + 1),
            Err(DomainError::Storage(_))
        ));
    }
}

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoicehub_core::{DomainError, DomainResult, InvoiceId, TenantId};

use crate::money::{normalize_currency, round_money};

/// Invoice lifecycle.
///
/// ```text
/// PENDING   -> EXTRACTED
/// EXTRACTED -> REVIEWED | APPROVED | REJECTED
/// REVIEWED  -> APPROVED | REJECTED
/// APPROVED  -> PAID
/// ```
///
/// Forward-only; `REJECTED` and `PAID` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Extracted,
    Reviewed,
    Approved,
    Rejected,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 6] = [
        Self::Pending,
        Self::Extracted,
        Self::Reviewed,
        Self::Approved,
        Self::Rejected,
        Self::Paid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Extracted => "EXTRACTED",
            Self::Reviewed => "REVIEWED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Paid => "PAID",
        }
    }

    /// States reachable in one step.
    pub fn successors(self) -> &'static [InvoiceStatus] {
        match self {
            Self::Pending => &[Self::Extracted],
            Self::Extracted => &[Self::Reviewed, Self::Approved, Self::Rejected],
            Self::Reviewed => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Paid],
            Self::Rejected | Self::Paid => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Re-setting the current status is always allowed (no-op).
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        self == next || self.successors().contains(&next)
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown invoice status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// 0-based order within the invoice.
    pub position: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// A tenant-owned invoice with its ordered line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenantId,
    pub invoice_number: String,
    pub vendor_name: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: InvoiceStatus,
    pub tax_amount: Option<Decimal>,
    pub shipping_amount: Option<Decimal>,
    pub payment_terms: Option<String>,
    /// Storage key of the original document, as reported by the extractor.
    pub document_key: Option<String>,
    pub document_url: Option<String>,
    pub source_filename: Option<String>,
    /// Extraction confidence in `[0, 1]`; only set for machine-extracted invoices.
    pub confidence_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<InvoiceLineItem>,
}

/// Input for a new invoice, before ids, timestamps and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub vendor_name: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub tax_amount: Option<Decimal>,
    pub shipping_amount: Option<Decimal>,
    pub payment_terms: Option<String>,
    pub document_key: Option<String>,
    pub document_url: Option<String>,
    pub source_filename: Option<String>,
    pub confidence_score: Option<f64>,
    pub line_items: Vec<NewLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl Invoice {
    /// Validate and normalize `new` into an invoice owned by `tenant_id`.
    ///
    /// Money is rounded to two places and the currency defaults to `USD`.
    pub fn create(
        tenant_id: TenantId,
        new: NewInvoice,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let invoice_number = required_text(&new.invoice_number, "invoice_number")?;
        let vendor_name = required_text(&new.vendor_name, "vendor_name")?;
        let invoice_date = new
            .invoice_date
            .ok_or_else(|| DomainError::validation("invoice_date is required"))?;
        let currency = normalize_currency(new.currency.as_deref())?;

        if let Some(score) = new.confidence_score {
            if !score.is_finite() || !(0.0..=1.0).contains(&score) {
                return Err(DomainError::validation(format!(
                    "confidence_score must be between 0 and 1, got {score}"
                )));
            }
        }

        let line_items = new
            .line_items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                Ok(InvoiceLineItem {
                    position: u32::try_from(position)
                        .map_err(|_| DomainError::validation("too many line items"))?,
                    description: required_text(&item.description, "line_items.description")?,
                    quantity: item.quantity,
                    unit_price: round_money(item.unit_price),
                    amount: round_money(item.amount),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            id: InvoiceId::new(),
            tenant_id,
            invoice_number,
            vendor_name,
            invoice_date,
            due_date: new.due_date,
            total_amount: round_money(new.total_amount),
            currency,
            status,
            tax_amount: new.tax_amount.map(round_money),
            shipping_amount: new.shipping_amount.map(round_money),
            payment_terms: optional_text(new.payment_terms),
            document_key: optional_text(new.document_key),
            document_url: optional_text(new.document_url),
            source_filename: optional_text(new.source_filename),
            confidence_score: new.confidence_score,
            created_at: now,
            updated_at: now,
            line_items,
        })
    }

    /// Move to `next`, bumping `updated_at`.
    ///
    /// Returns `Ok(false)` when `next` is already the current status.
    pub fn transition(&mut self, next: InvoiceStatus, now: DateTime<Utc>) -> DomainResult<bool> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::validation(format!(
                "invalid status transition from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(true)
    }
}

fn required_text(value: &str, field: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//! Extraction-service payloads.
//!
//! The wire shapes (`Raw*`) are deliberately loose: the service is
//! LLM-backed and will send numbers as strings, dates as timestamps, and
//! nulls anywhere. [`ExtractionResult`] is the typed, validated view the rest
//! of the crate works with; the conversion happens exactly once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use invoicehub_core::{DomainError, DomainResult};

use crate::invoice::{NewInvoice, NewLineItem};
use crate::money::{decimal_from_json, normalize_currency, round_money};

/// Response envelope of `POST /extract-invoice`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtractionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
    #[serde(default)]
    pub s3_url: Option<String>,
    #[serde(default)]
    pub extraction_method: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<Value>,
    #[serde(default)]
    pub extracted_data: Option<RawExtractedData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtractedData {
    #[serde(default)]
    pub invoice_number: Option<Value>,
    #[serde(default)]
    pub vendor_name: Option<Value>,
    #[serde(default)]
    pub invoice_date: Option<Value>,
    #[serde(default)]
    pub due_date: Option<Value>,
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub tax_amount: Option<Value>,
    #[serde(default)]
    pub shipping_amount: Option<Value>,
    #[serde(default)]
    pub payment_terms: Option<Value>,
    #[serde(default)]
    pub line_items: Option<Vec<RawLineItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub unit_price: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Validated extraction output.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub invoice_number: String,
    pub vendor_name: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub currency: String,
    pub tax_amount: Option<Decimal>,
    pub shipping_amount: Option<Decimal>,
    pub payment_terms: Option<String>,
    pub confidence_score: Option<f64>,
    pub document_key: Option<String>,
    pub document_url: Option<String>,
    pub source_filename: Option<String>,
    pub line_items: Vec<ExtractedLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl TryFrom<RawExtractionResponse> for ExtractionResult {
    type Error = DomainError;

    fn try_from(raw: RawExtractionResponse) -> Result<Self, Self::Error> {
        let data = raw
            .extracted_data
            .ok_or_else(|| DomainError::upstream(None, "no extracted data in extraction response"))?;

        let line_items = data
            .line_items
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, item)| line_item(i, item))
            .collect::<DomainResult<Vec<_>>>()?;

        let confidence_score = raw
            .confidence_score
            .as_ref()
            .filter(|v| !v.is_null())
            .map(confidence)
            .transpose()?;

        Ok(Self {
            invoice_number: required(data.invoice_number.as_ref(), "invoice_number", text)?,
            vendor_name: required(data.vendor_name.as_ref(), "vendor_name", text)?,
            invoice_date: required(data.invoice_date.as_ref(), "invoice_date", date)?,
            due_date: optional(data.due_date.as_ref(), "due_date", date)?,
            total_amount: required(data.total_amount.as_ref(), "total_amount", money)?,
            currency: normalize_currency(optional(data.currency.as_ref(), "currency", text)?.as_deref())?,
            tax_amount: optional(data.tax_amount.as_ref(), "tax_amount", money)?,
            shipping_amount: optional(data.shipping_amount.as_ref(), "shipping_amount", money)?,
            payment_terms: optional(data.payment_terms.as_ref(), "payment_terms", text)?,
            confidence_score,
            document_key: raw.s3_key,
            document_url: raw.s3_url,
            source_filename: raw.filename,
            line_items,
        })
    }
}

impl ExtractionResult {
    pub fn into_new_invoice(self) -> NewInvoice {
        NewInvoice {
            invoice_number: self.invoice_number,
            vendor_name: self.vendor_name,
            invoice_date: Some(self.invoice_date),
            due_date: self.due_date,
            total_amount: self.total_amount,
            currency: Some(self.currency),
            tax_amount: self.tax_amount,
            shipping_amount: self.shipping_amount,
            payment_terms: self.payment_terms,
            document_key: self.document_key,
            document_url: self.document_url,
            source_filename: self.source_filename,
            confidence_score: self.confidence_score,
            line_items: self
                .line_items
                .into_iter()
                .map(|item| NewLineItem {
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    amount: item.amount,
                })
                .collect(),
        }
    }
}

fn line_item(index: usize, raw: &RawLineItem) -> DomainResult<ExtractedLineItem> {
    let field = |name: &str| format!("line_items[{index}].{name}");
    Ok(ExtractedLineItem {
        description: required(raw.description.as_ref(), &field("description"), text)?,
        quantity: required(raw.quantity.as_ref(), &field("quantity"), quantity)?,
        unit_price: required(raw.unit_price.as_ref(), &field("unit_price"), money)?,
        amount: required(raw.amount.as_ref(), &field("amount"), money)?,
    })
}

/// Null and absent are the same thing.
fn optional<T>(
    value: Option<&Value>,
    field: &str,
    parse: impl Fn(&Value, &str) -> DomainResult<Option<T>>,
) -> DomainResult<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse(v, field),
    }
}

fn required<T>(
    value: Option<&Value>,
    field: &str,
    parse: impl Fn(&Value, &str) -> DomainResult<Option<T>>,
) -> DomainResult<T> {
    optional(value, field, parse)?
        .ok_or_else(|| DomainError::validation(format!("extraction result is missing '{field}'")))
}

fn text(value: &Value, field: &str) -> DomainResult<Option<String>> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(DomainError::validation(format!(
                "expected text for '{field}', got {other}"
            )));
        }
    };
    Ok(Some(text).filter(|t| !t.is_empty()))
}

fn quantity(value: &Value, field: &str) -> DomainResult<Option<Decimal>> {
    decimal_from_json(value, field).map(Some)
}

fn money(value: &Value, field: &str) -> DomainResult<Option<Decimal>> {
    decimal_from_json(value, field).map(|d| Some(round_money(d)))
}

/// `YYYY-MM-DD`, or a timestamp whose first ten characters are the date.
fn date(value: &Value, field: &str) -> DomainResult<Option<NaiveDate>> {
    let invalid = || DomainError::validation(format!("cannot parse date {value} for field '{field}'"));

    let Value::String(s) = value else {
        return Err(invalid());
    };
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let day = if s.contains('T') { s.get(..10).ok_or_else(invalid)? } else { s };

    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| invalid())
}

fn confidence(value: &Value) -> DomainResult<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DomainError::validation(format!("cannot parse confidence_score {value}")))?;

    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(DomainError::validation(format!(
            "confidence_score must be between 0 and 1, got {score}"
        )));
    }
    Ok(score)
}

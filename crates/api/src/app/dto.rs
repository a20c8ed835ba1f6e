use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use invoicehub_auth::{Credentials, Registration, UserProfile};
use invoicehub_core::{DomainError, DomainResult};
use invoicehub_invoicing::money::decimal_from_json;
use invoicehub_invoicing::{Invoice, NewInvoice, NewLineItem};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tenant_name: String,
    pub tenant_slug: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            tenant_name: req.tenant_name,
            tenant_slug: req.tenant_slug,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub tenant_slug: Option<String>,
}

impl From<LoginRequest> for Credentials {
    fn from(req: LoginRequest) -> Self {
        Credentials {
            username: req.username,
            password: req.password,
            tenant_slug: req.tenant_slug,
        }
    }
}

/// Amounts stay raw JSON so both `150.5` and `"150.50"` are accepted
/// without passing through `f64`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub invoice_number: String,
    pub vendor_name: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Value,
    pub currency: Option<String>,
    pub tax_amount: Option<Value>,
    pub shipping_amount: Option<Value>,
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub line_items: Vec<CreateLineItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLineItemRequest {
    pub description: String,
    pub quantity: Option<Value>,
    pub unit_price: Value,
    pub amount: Option<Value>,
}

impl CreateInvoiceRequest {
    pub fn into_new_invoice(self) -> DomainResult<NewInvoice> {
        let line_items = self
            .line_items
            .into_iter()
            .map(CreateLineItemRequest::into_new_line_item)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(NewInvoice {
            invoice_number: self.invoice_number,
            vendor_name: self.vendor_name,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            total_amount: decimal_from_json(&self.total_amount, "totalAmount")?,
            currency: self.currency,
            tax_amount: optional_amount(self.tax_amount.as_ref(), "taxAmount")?,
            shipping_amount: optional_amount(self.shipping_amount.as_ref(), "shippingAmount")?,
            payment_terms: self.payment_terms,
            line_items,
            ..NewInvoice::default()
        })
    }
}

impl CreateLineItemRequest {
    fn into_new_line_item(self) -> DomainResult<NewLineItem> {
        let quantity = optional_amount(self.quantity.as_ref(), "quantity")?.unwrap_or(Decimal::ONE);
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let unit_price = decimal_from_json(&self.unit_price, "unitPrice")?;
        let amount = match optional_amount(self.amount.as_ref(), "amount")? {
            Some(amount) => amount,
            None => quantity
                .checked_mul(unit_price)
                .ok_or_else(|| DomainError::validation("line item amount overflows"))?,
        };

        Ok(NewLineItem {
            description: self.description,
            quantity,
            unit_price,
            amount,
        })
    }
}

fn optional_amount(value: Option<&Value>, field: &str) -> DomainResult<Option<Decimal>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => decimal_from_json(v, field).map(Some),
    }
}

// -------------------------
// Response mapping helpers
// -------------------------

pub fn auth_response_to_json(profile: &UserProfile, token: Option<&str>, message: &str) -> Value {
    serde_json::json!({
        "username": profile.username,
        "email": profile.email,
        "tenantId": profile.tenant_id.to_string(),
        "tenantName": profile.tenant_name,
        "message": message,
        "token": token,
    })
}

pub fn profile_to_json(profile: &UserProfile) -> Value {
    serde_json::json!({
        "userId": profile.user_id.to_string(),
        "username": profile.username,
        "email": profile.email,
        "firstName": profile.first_name,
        "lastName": profile.last_name,
        "tenantId": profile.tenant_id.to_string(),
        "tenantName": profile.tenant_name,
        "message": "User information retrieved",
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> Value {
    serde_json::json!({
        "id": invoice.id.to_string(),
        "tenantId": invoice.tenant_id.to_string(),
        "invoiceNumber": invoice.invoice_number,
        "vendorName": invoice.vendor_name,
        "invoiceDate": invoice.invoice_date.to_string(),
        "dueDate": invoice.due_date.map(|d| d.to_string()),
        "totalAmount": invoice.total_amount.to_string(),
        "currency": invoice.currency,
        "status": invoice.status.as_str(),
        "taxAmount": invoice.tax_amount.map(|a| a.to_string()),
        "shippingAmount": invoice.shipping_amount.map(|a| a.to_string()),
        "paymentTerms": invoice.payment_terms,
        "documentKey": invoice.document_key,
        "documentUrl": invoice.document_url,
        "sourceFilename": invoice.source_filename,
        "confidenceScore": invoice.confidence_score,
        "createdAt": invoice.created_at.to_rfc3339(),
        "updatedAt": invoice.updated_at.to_rfc3339(),
        "lineItems": invoice.line_items.iter().map(|l| serde_json::json!({
            "position": l.position,
            "description": l.description,
            "quantity": l.quantity.normalize().to_string(),
            "unitPrice": l.unit_price.to_string(),
            "amount": l.amount.to_string(),
        })).collect::<Vec<_>>(),
    })
}

//! Fixed-point amounts and currency codes.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use invoicehub_core::{DomainError, DomainResult};

/// Currency used when none is given.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Round a monetary amount to exactly two fractional digits.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Parse a decimal from its textual form.
///
/// Accepts plain (`"150.00"`) and scientific (`"1.5e2"`) notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Interpret a JSON number or numeric string as a decimal.
///
/// Numbers go through their JSON text, never through floating-point
/// arithmetic.
pub fn decimal_from_json(value: &Value, field: &str) -> DomainResult<Decimal> {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed.ok_or_else(|| DomainError::validation(format!("cannot parse amount '{value}' for field '{field}'")))
}

/// Three ASCII letters, upper-cased. Missing or blank means [`DEFAULT_CURRENCY`].
pub fn normalize_currency(code: Option<&str>) -> DomainResult<String> {
    let code = match code.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_CURRENCY.to_string()),
        Some(code) => code,
    };
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation(format!("invalid currency code '{code}'")));
    }
    Ok(code.to_ascii_uppercase())
}

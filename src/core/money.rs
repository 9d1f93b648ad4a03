//! Currency codes and monetary amounts

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Code of the pivot currency every upstream rate is expressed against.
pub const USD: &str = "USD";

/// Raised when user input cannot form a valid conversion request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a 3-letter currency code, got {value:?}")]
    InvalidCurrency { field: &'static str, value: String },
    #[error("amount must be a number, got {0:?}")]
    InvalidAmount(String),
}

/// A 3-letter ISO-style currency code, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn usd() -> Self {
        Currency(USD.to_string())
    }

    pub fn is_usd(&self) -> bool {
        self.0 == USD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Currency(code))
        } else {
            Err(ValidationError::InvalidCurrency {
                field: "currency",
                value: s.to_string(),
            })
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Currency {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub value: f64,
    pub currency: Currency,
}

impl Money {
    pub fn new(value: f64, currency: Currency) -> Self {
        Money { value, currency }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_money(self, 2))
    }
}

/// Formats an amount en-US style with a fixed number of decimals and the
/// currency code as suffix, e.g. `1,234.50 EUR`.
pub fn format_money(amount: &Money, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = amount.value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac} {}", amount.currency),
        None => format!("{sign}{grouped} {}", amount.currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(value: f64, code: &str) -> Money {
        Money::new(value, code.parse().unwrap())
    }

    #[test]
    fn test_currency_parsing_normalizes_case() {
        let eur: Currency = " eur ".parse().unwrap();
        assert_eq!(eur.as_str(), "EUR");
        assert!(!eur.is_usd());
        assert!("usd".parse::<Currency>().unwrap().is_usd());
    }

    #[test]
    fn test_currency_parsing_rejects_bad_codes() {
        for bad in ["", "EU", "EURO", "E1R", "€€€"] {
            assert!(bad.parse::<Currency>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_format_money_groups_thousands() {
        assert_eq!(format_money(&money(1234567.891, "EUR"), 2), "1,234,567.89 EUR");
        assert_eq!(format_money(&money(999.0, "CZK"), 2), "999.00 CZK");
        assert_eq!(format_money(&money(1000.0, "JPY"), 0), "1,000 JPY");
        assert_eq!(format_money(&money(-2500.5, "USD"), 1), "-2,500.5 USD");
    }

    #[test]
    fn test_format_money_drops_sign_of_rounded_zero() {
        assert_eq!(format_money(&money(-0.001, "USD"), 2), "0.00 USD");
    }

    #[test]
    fn test_money_serializes_currency_as_plain_string() {
        let json = serde_json::to_string(&money(10.0, "EUR")).unwrap();
        assert_eq!(json, r#"{"value":10.0,"currency":"EUR"}"#);
    }
}

//! Currency codes and amount checks.
//!
//! Amounts are plain `i64` values in the smallest unit of the branch's
//! currency (cents, paise, ...). A branch carries exactly one currency, so
//! every fee and payment attached to it is implicitly denominated in it.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// ISO-4217 style currency code, e.g. `LKR` or `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Validates and normalizes a currency code (three ASCII letters).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(DomainError::InvalidCurrency(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejects negative fee or payment amounts.
pub fn ensure_non_negative(amount: i64) -> Result<i64, DomainError> {
    if amount < 0 {
        return Err(DomainError::NegativeAmount);
    }
    Ok(amount)
}

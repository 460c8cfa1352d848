use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// More than two decimal places are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, AmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(AmountError::InvalidFormat(input.to_string()));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(units_str) || !all_digits(decimal_str) {
        return Err(AmountError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| AmountError::OutOfRange)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "5" means 50 cents
        1 => decimal_str[..1].parse::<i64>().map_err(|_| AmountError::OutOfRange)? * 10,
        _ => decimal_str[..2].parse().map_err(|_| AmountError::OutOfRange)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(AmountError::OutOfRange)?;
    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),

    #[error("amount must be positive, got {0} cents")]
    NotPositive(Cents),

    #[error("amount must be a finite number")]
    NotFinite,

    #[error("amount is out of range")]
    OutOfRange,
}

/// A strictly positive amount of money, validated at construction.
///
/// Deposits, withdrawals and transfers only accept `Amount`, so zero,
/// negative and non-finite values are rejected before they reach an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(Cents);

impl Amount {
    pub fn from_cents(cents: Cents) -> Result<Self, AmountError> {
        if cents <= 0 {
            return Err(AmountError::NotPositive(cents));
        }
        Ok(Self(cents))
    }

    /// Parse a decimal currency string such as "30.00" or "12.5".
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        Self::from_cents(parse_cents(input)?)
    }

    /// Convert a floating-point currency value, rounding to the nearest cent.
    pub fn from_decimal(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return Err(AmountError::OutOfRange);
        }
        Self::from_cents(cents as i64)
    }

    pub fn cents(self) -> Cents {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cents(self.0))
    }
}

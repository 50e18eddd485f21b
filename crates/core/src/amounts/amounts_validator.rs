//! Validation of monetary amounts against the store's fixed-precision column.
//!
//! All boundary comparisons run on the string digits, never on floats, so a
//! value one minor unit above the column maximum is still caught exactly.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::MAX_AMOUNT_INTEGER_DIGITS;
use crate::currencies::minor_unit_exponent;
use crate::errors::{Error, Result};

/// Errors produced while validating a monetary amount string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is required")]
    Empty,

    #[error("Amount '{0}' is not a number")]
    NotNumeric(String),

    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("{currency} amounts allow at most {max_places} decimal places")]
    TooManyDecimalPlaces { currency: String, max_places: u32 },

    #[error("Amount exceeds the maximum of {max}")]
    ExceedsMaximum { max: String },
}

/// Digit parts of an amount string: sign, integer digits (leading zeros
/// stripped), fractional digits.
struct AmountParts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

fn split_amount(value: &str) -> std::result::Result<AmountParts<'_>, AmountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (integer, fraction) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (digits, ""),
    };

    let all_digits =
        integer.chars().all(|c| c.is_ascii_digit()) && fraction.chars().all(|c| c.is_ascii_digit());
    if !all_digits || (integer.is_empty() && fraction.is_empty()) {
        return Err(AmountError::NotNumeric(value.to_string()));
    }

    Ok(AmountParts {
        negative,
        integer: integer.trim_start_matches('0'),
        fraction,
    })
}

/// The largest representable amount string for a currency: fifteen integer
/// nines, then one nine per minor-unit digit.
pub fn max_amount_string(currency: &str) -> Result<String> {
    let exponent = minor_unit_exponent(currency)
        .ok_or_else(|| Error::UnsupportedCurrency(currency.to_string()))?;

    let mut max = "9".repeat(MAX_AMOUNT_INTEGER_DIGITS);
    if exponent > 0 {
        max.push('.');
        max.push_str(&"9".repeat(exponent as usize));
    }
    Ok(max)
}

/// True when the amount's magnitude is above the currency's column maximum.
///
/// Compares digit strings: more than fifteen integer digits always exceeds;
/// exactly fifteen exceeds only when every integer digit is nine and the
/// fraction runs past the exponent nines.
pub fn exceeds_max_amount(value: &str, currency: &str) -> Result<bool> {
    let exponent = minor_unit_exponent(currency)
        .ok_or_else(|| Error::UnsupportedCurrency(currency.to_string()))?;
    let parts = split_amount(value).map_err(Error::Amount)?;

    if parts.integer.len() > MAX_AMOUNT_INTEGER_DIGITS {
        return Ok(true);
    }
    if parts.integer.len() < MAX_AMOUNT_INTEGER_DIGITS || parts.integer.contains(|c: char| c != '9') {
        return Ok(false);
    }

    // Integer part is exactly the fifteen-nine maximum; the fraction decides.
    for (i, c) in parts.fraction.char_indices() {
        if i < exponent as usize {
            if c < '9' {
                return Ok(false);
            }
        } else if c != '0' {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Validates an amount string for a currency and parses it into a `Decimal`.
///
/// Checks run in order: numeric shape, positivity, decimal places against the
/// currency's minor-unit exponent, then the column maximum.
pub fn validate_amount(value: &str, currency: &str) -> Result<Decimal> {
    let parts = split_amount(value).map_err(Error::Amount)?;
    let is_zero = parts.integer.is_empty() && parts.fraction.chars().all(|c| c == '0');
    if parts.negative || is_zero {
        return Err(AmountError::NotPositive.into());
    }
    validate_signed_amount(value, currency)
}

/// Like [`validate_amount`] but without the positivity requirement: zero and
/// negative values pass. Used for starting balances and adjustment targets,
/// where a signed value is meaningful.
pub fn validate_signed_amount(value: &str, currency: &str) -> Result<Decimal> {
    let exponent = minor_unit_exponent(currency)
        .ok_or_else(|| Error::UnsupportedCurrency(currency.to_string()))?;
    let parts = split_amount(value).map_err(Error::Amount)?;

    let significant_places = parts.fraction.trim_end_matches('0').len();
    if significant_places > exponent as usize {
        return Err(AmountError::TooManyDecimalPlaces {
            currency: currency.to_string(),
            max_places: exponent,
        }
        .into());
    }

    if exceeds_max_amount(value, currency)? {
        return Err(AmountError::ExceedsMaximum {
            max: max_amount_string(currency)?,
        }
        .into());
    }

    Decimal::from_str(value.trim())
        .map_err(|_| AmountError::NotNumeric(value.to_string()).into())
}

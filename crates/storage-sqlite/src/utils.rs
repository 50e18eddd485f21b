//! Small helpers shared by the repository modules.

use rust_decimal::Decimal;
use std::str::FromStr;

use pennybook_core::Result;

use crate::errors::StorageError;

/// Parses a TEXT decimal column; a malformed value is a decode failure, never
/// a silent zero.
pub(crate) fn parse_decimal(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::DecodeFailed(format!("{column} '{value}': {e}")).into())
}

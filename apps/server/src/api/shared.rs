//! Helpers shared by the route modules.

use axum::http::HeaderMap;
use chrono::NaiveDate;

use pennybook_core::errors::{Error, ValidationError};

use crate::error::ApiError;

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ApiError(Error::Validation(ValidationError::InvalidInput(format!(
            "{field} must be a YYYY-MM-DD date, got '{value}'"
        ))))
    })
}

pub fn parse_date_optional(
    value: Option<String>,
    field: &str,
) -> Result<Option<NaiveDate>, ApiError> {
    value.map(|v| parse_date(&v, field)).transpose()
}

/// The caller-supplied retry key, when the header is present and readable.
pub fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

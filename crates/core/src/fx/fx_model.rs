//! FX domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currencies::validate_currency_code;
use crate::errors::Result;
use crate::fx::fx_errors::FxError;

/// Where a stored exchange rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    #[default]
    Manual,
    Provider,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Manual => "MANUAL",
            RateSource::Provider => "PROVIDER",
        }
    }
}

impl std::str::FromStr for RateSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANUAL" => Ok(RateSource::Manual),
            "PROVIDER" => Ok(RateSource::Provider),
            other => Err(format!("Unknown rate source: {other}")),
        }
    }
}

/// A stored historical exchange rate for one calendar date.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    #[serde(
        serialize_with = "serialize_decimal_6",
        deserialize_with = "deserialize_decimal"
    )]
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    pub source: RateSource,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    /// Accepted as a decimal string on the wire.
    #[serde(
        serialize_with = "serialize_decimal_6",
        deserialize_with = "deserialize_decimal"
    )]
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    #[serde(default)]
    pub source: RateSource,
}

impl NewExchangeRate {
    /// Validates the new rate data.
    pub fn validate(&self) -> Result<()> {
        validate_currency_code(&self.from_currency)?;
        validate_currency_code(&self.to_currency)?;
        if self.from_currency.eq_ignore_ascii_case(&self.to_currency) {
            return Err(FxError::InvalidRate(
                "From and to currencies must differ".to_string(),
            )
            .into());
        }
        if self.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate(format!(
                "Rate must be positive, got {}",
                self.rate
            ))
            .into());
        }
        Ok(())
    }
}

/// Staleness classification of a resolved historical rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSeverity {
    /// Rate is dated exactly on the requested date.
    #[default]
    None,
    /// Rate is 1-7 days older than the requested date.
    Recent,
    /// Rate is 8-30 days older than the requested date.
    Outdated,
    /// Rate is older than 30 days but inside the lookback window.
    Old,
    /// No usable rate inside the lookback window; a manual rate is required.
    Critical,
}

impl RateSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSeverity::None => "none",
            RateSeverity::Recent => "recent",
            RateSeverity::Outdated => "outdated",
            RateSeverity::Old => "old",
            RateSeverity::Critical => "critical",
        }
    }
}

/// Outcome of resolving a rate for a currency pair on a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResolution {
    #[serde(
        default,
        serialize_with = "serialize_optional_decimal_6",
        deserialize_with = "deserialize_optional_decimal"
    )]
    pub rate: Option<Decimal>,
    pub rate_date: Option<NaiveDate>,
    pub severity: RateSeverity,
    pub exact_match: bool,
    pub requires_manual_input: bool,
}

impl RateResolution {
    /// A rate stored exactly on the requested date.
    pub fn exact(rate: Decimal, rate_date: NaiveDate) -> Self {
        Self {
            rate: Some(rate),
            rate_date: Some(rate_date),
            severity: RateSeverity::None,
            exact_match: true,
            requires_manual_input: false,
        }
    }

    /// A fallback rate from an earlier date, with its staleness class.
    pub fn stale(rate: Decimal, rate_date: NaiveDate, severity: RateSeverity) -> Self {
        Self {
            rate: Some(rate),
            rate_date: Some(rate_date),
            severity,
            exact_match: false,
            requires_manual_input: false,
        }
    }

    /// No usable rate inside the lookback window.
    pub fn missing() -> Self {
        Self {
            rate: None,
            rate_date: None,
            severity: RateSeverity::Critical,
            exact_match: false,
            requires_manual_input: true,
        }
    }
}

/// Staleness thresholds for the resolver, in days relative to the
/// transaction date. Defaults follow the severity ladder: 7 for recent,
/// 30 for outdated, and a 60-day lookback before a rate is treated as
/// missing entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverThresholds {
    pub recent_days: i64,
    pub outdated_days: i64,
    pub lookback_days: i64,
}

impl Default for ResolverThresholds {
    fn default() -> Self {
        Self {
            recent_days: 7,
            outdated_days: 30,
            lookback_days: 60,
        }
    }
}

impl ResolverThresholds {
    /// Classifies the age (in days) of a fallback rate.
    pub fn classify(&self, age_days: i64) -> RateSeverity {
        if age_days <= 0 {
            RateSeverity::None
        } else if age_days <= self.recent_days {
            RateSeverity::Recent
        } else if age_days <= self.outdated_days {
            RateSeverity::Outdated
        } else {
            RateSeverity::Old
        }
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(6);
    serializer.serialize_str(&rounded.to_string())
}

fn serialize_optional_decimal_6<S>(
    decimal: &Option<Decimal>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match decimal {
        Some(d) => serialize_decimal_6(d, serializer),
        None => serializer.serialize_none(),
    }
}

// Rates arrive as decimal strings on the wire; numbers are accepted too.
fn deserialize_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum DecimalOrString {
        Decimal(Decimal),
        String(String),
    }

    match DecimalOrString::deserialize(deserializer)? {
        DecimalOrString::Decimal(d) => Ok(d),
        DecimalOrString::String(s) => {
            std::str::FromStr::from_str(s.trim()).map_err(serde::de::Error::custom)
        }
    }
}

fn deserialize_optional_decimal<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum DecimalOrString {
        Decimal(Decimal),
        String(String),
    }

    match Option::<DecimalOrString>::deserialize(deserializer)? {
        Some(DecimalOrString::Decimal(d)) => Ok(Some(d)),
        Some(DecimalOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(DecimalOrString::String(s)) => std::str::FromStr::from_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

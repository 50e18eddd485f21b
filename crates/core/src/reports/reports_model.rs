//! Report domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which wallets a totals query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletScope {
    All,
    Wallet(String),
}

/// Optional calendar bounds for a totals query, inclusive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Content filters for a totals query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsFilters {
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Income and expense totals over a period, in the base currency.
/// Transfers and system entries are excluded by definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSummary {
    #[serde(with = "decimal_string")]
    pub income: Decimal,
    #[serde(with = "decimal_string")]
    pub expenses: Decimal,
    #[serde(with = "decimal_string")]
    pub net: Decimal,
    pub currency: String,
}

/// One wallet's contribution to net worth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletValuation {
    pub wallet_id: String,
    pub name: String,
    pub currency: String,
    #[serde(with = "decimal_string")]
    pub balance: Decimal,
    /// Balance converted to the base currency; absent when no rate resolves.
    #[serde(default, with = "optional_decimal_string")]
    pub base_value: Option<Decimal>,
}

/// Net worth across wallets counted toward the balance, in base currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSummary {
    #[serde(with = "decimal_string")]
    pub total: Decimal,
    pub currency: String,
    pub valuations: Vec<WalletValuation>,
    /// Wallets left out of the total because their currency could not be
    /// converted.
    #[serde(default)]
    pub skipped_wallet_ids: Vec<String>,
}

pub(crate) mod decimal_string {
    use rust_decimal::Decimal;
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            Decimal(Decimal),
            String(String),
        }

        match DecimalOrString::deserialize(deserializer)? {
            DecimalOrString::Decimal(d) => Ok(d),
            DecimalOrString::String(s) => {
                Decimal::from_str(s.trim()).map_err(serde::de::Error::custom)
            }
        }
    }
}

pub(crate) mod optional_decimal_string {
    use rust_decimal::Decimal;
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            Decimal(Decimal),
            String(String),
            Null,
        }

        match Option::<DecimalOrString>::deserialize(deserializer)? {
            Some(DecimalOrString::Decimal(d)) => Ok(Some(d)),
            Some(DecimalOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(DecimalOrString::String(s)) => Decimal::from_str(s.trim())
                .map(Some)
                .map_err(serde::de::Error::custom),
            Some(DecimalOrString::Null) | None => Ok(None),
        }
    }
}

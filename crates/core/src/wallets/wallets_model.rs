//! Wallet domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amounts::validate_signed_amount;
use crate::currencies::{normalize_currency_code, validate_currency_code};
use crate::errors::{Error, Result, ValidationError};

/// Kind of wallet; decides the overdraft policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletType {
    Cash,
    Bank,
    DigitalWallet,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::Cash => "CASH",
            WalletType::Bank => "BANK",
            WalletType::DigitalWallet => "DIGITAL_WALLET",
        }
    }

    /// Cash wallets are hard-blocked from going negative; other types may
    /// overdraw with a warning.
    pub fn allows_overdraft(&self) -> bool {
        !matches!(self, WalletType::Cash)
    }
}

impl std::str::FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(WalletType::Cash),
            "BANK" => Ok(WalletType::Bank),
            "DIGITAL_WALLET" => Ok(WalletType::DigitalWallet),
            other => Err(format!("Unknown wallet type: {other}")),
        }
    }
}

/// Domain model representing a wallet in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub wallet_type: WalletType,
    pub currency: String,
    #[serde(with = "decimal_string")]
    pub starting_balance: Decimal,
    #[serde(with = "decimal_string")]
    pub current_balance: Decimal,
    pub include_in_balance: bool,
    pub is_archived: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub wallet_type: WalletType,
    pub currency: String,
    /// Decimal string; absent means zero.
    pub starting_balance: Option<String>,
    #[serde(default = "default_include_in_balance")]
    pub include_in_balance: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
}

fn default_include_in_balance() -> bool {
    true
}

impl NewWallet {
    /// Validates the new wallet data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Wallet name cannot be empty".to_string(),
            )));
        }
        validate_currency_code(&self.currency)?;
        let starting = self.starting_balance_decimal()?;
        if starting < Decimal::ZERO && !self.wallet_type.allows_overdraft() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Cash wallets cannot start with a negative balance".to_string(),
            )));
        }
        Ok(())
    }

    /// The starting balance as a decimal, defaulting to zero.
    pub fn starting_balance_decimal(&self) -> Result<Decimal> {
        match self.starting_balance.as_deref() {
            Some(value) => validate_signed_amount(value, &self.currency),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Uppercased currency code for persistence.
    pub fn normalized_currency(&self) -> String {
        normalize_currency_code(&self.currency)
    }
}

/// Input model for updating an existing wallet.
///
/// Currency and wallet type are fixed at creation; transactions already carry
/// amounts in the wallet's currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletUpdate {
    pub id: Option<String>,
    pub name: String,
    pub include_in_balance: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl WalletUpdate {
    /// Validates the wallet update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Wallet ID is required for updates".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Wallet name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
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
        // Accept both string and number representations on the wire
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

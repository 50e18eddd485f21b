//! Ledger domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_TAGS_PER_TRANSACTION, SYSTEM_CATEGORY_BALANCE_ADJUSTMENT_ID,
    SYSTEM_CATEGORY_INITIAL_BALANCE_ID,
};
use crate::errors::Result;
use crate::fx::RateSeverity;
use crate::ledger::ledger_constants::*;
use crate::ledger::ledger_errors::LedgerError;

/// Shape of a transaction: income and expense reference a single wallet and
/// a category; a transfer references two wallets and no category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transactionType", rename_all = "camelCase")]
pub enum TransactionKind {
    #[serde(rename_all = "camelCase")]
    Income {
        wallet_id: String,
        category_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Expense {
        wallet_id: String,
        category_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        from_wallet_id: String,
        to_wallet_id: String,
    },
}

impl TransactionKind {
    /// Storage discriminator for this shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income { .. } => TRANSACTION_TYPE_INCOME,
            TransactionKind::Expense { .. } => TRANSACTION_TYPE_EXPENSE,
            TransactionKind::Transfer { .. } => TRANSACTION_TYPE_TRANSFER,
        }
    }

    /// The wallet whose currency denominates the transaction amount.
    pub fn primary_wallet_id(&self) -> &str {
        match self {
            TransactionKind::Income { wallet_id, .. } => wallet_id,
            TransactionKind::Expense { wallet_id, .. } => wallet_id,
            TransactionKind::Transfer { from_wallet_id, .. } => from_wallet_id,
        }
    }

    /// Every wallet this transaction touches.
    pub fn wallet_ids(&self) -> Vec<&str> {
        match self {
            TransactionKind::Income { wallet_id, .. } => vec![wallet_id],
            TransactionKind::Expense { wallet_id, .. } => vec![wallet_id],
            TransactionKind::Transfer {
                from_wallet_id,
                to_wallet_id,
            } => vec![from_wallet_id, to_wallet_id],
        }
    }

    pub fn category_id(&self) -> Option<&str> {
        match self {
            TransactionKind::Income { category_id, .. } => Some(category_id),
            TransactionKind::Expense { category_id, .. } => Some(category_id),
            TransactionKind::Transfer { .. } => None,
        }
    }
}

/// Kind of system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemKind {
    InitialBalance,
    BalanceAdjustment,
}

impl SystemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemKind::InitialBalance => SYSTEM_KIND_INITIAL_BALANCE,
            SystemKind::BalanceAdjustment => SYSTEM_KIND_BALANCE_ADJUSTMENT,
        }
    }
}

impl std::str::FromStr for SystemKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            SYSTEM_KIND_INITIAL_BALANCE => Ok(SystemKind::InitialBalance),
            SYSTEM_KIND_BALANCE_ADJUSTMENT => Ok(SystemKind::BalanceAdjustment),
            other => Err(format!("Unknown system entry kind: {other}")),
        }
    }
}

/// A signed balance change against one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEffect {
    pub wallet_id: String,
    #[serde(with = "decimal_string")]
    pub delta: Decimal,
}

/// Domain model representing a transaction in the ledger.
///
/// `amount` is a positive magnitude in the primary wallet's currency; signing
/// is derived per wallet leg. A cross-currency transfer additionally carries
/// the converted credit amount (`to_amount`) for the destination leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(flatten)]
    pub kind: TransactionKind,
    #[serde(with = "decimal_string")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, with = "optional_decimal_string")]
    pub to_amount: Option<Decimal>,
    #[serde(default)]
    pub to_currency: Option<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub system_kind: Option<SystemKind>,
    #[serde(default, with = "optional_decimal_string")]
    pub exchange_rate_used: Option<Decimal>,
    #[serde(default)]
    pub exchange_rate_date: Option<NaiveDate>,
    #[serde(default)]
    pub manual_exchange_rate: bool,
    #[serde(default, with = "optional_decimal_string")]
    pub base_currency_amount: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Signed balance changes this transaction applies to its wallets.
    pub fn signed_effects(&self) -> Vec<BalanceEffect> {
        match &self.kind {
            TransactionKind::Income { wallet_id, .. } => vec![BalanceEffect {
                wallet_id: wallet_id.clone(),
                delta: self.amount,
            }],
            TransactionKind::Expense { wallet_id, .. } => vec![BalanceEffect {
                wallet_id: wallet_id.clone(),
                delta: -self.amount,
            }],
            TransactionKind::Transfer {
                from_wallet_id,
                to_wallet_id,
            } => vec![
                BalanceEffect {
                    wallet_id: from_wallet_id.clone(),
                    delta: -self.amount,
                },
                BalanceEffect {
                    wallet_id: to_wallet_id.clone(),
                    delta: self.to_amount.unwrap_or(self.amount),
                },
            ],
        }
    }

    /// Negation of [`signed_effects`], used when deleting or replacing.
    pub fn reverse_effects(&self) -> Vec<BalanceEffect> {
        self.signed_effects()
            .into_iter()
            .map(|e| BalanceEffect {
                wallet_id: e.wallet_id,
                delta: -e.delta,
            })
            .collect()
    }

    /// Opening-balance system entry recorded at wallet creation.
    pub fn opening_balance(
        wallet_id: &str,
        currency: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self::system_entry(
            wallet_id,
            currency,
            amount,
            date,
            SystemKind::InitialBalance,
            SYSTEM_CATEGORY_INITIAL_BALANCE_ID,
            None,
        )
    }

    /// Balance-adjustment system entry moving a wallet by `delta`.
    pub fn balance_adjustment(
        wallet_id: &str,
        currency: &str,
        delta: Decimal,
        date: NaiveDate,
        description: Option<String>,
    ) -> Self {
        Self::system_entry(
            wallet_id,
            currency,
            delta,
            date,
            SystemKind::BalanceAdjustment,
            SYSTEM_CATEGORY_BALANCE_ADJUSTMENT_ID,
            description,
        )
    }

    fn system_entry(
        wallet_id: &str,
        currency: &str,
        delta: Decimal,
        date: NaiveDate,
        system_kind: SystemKind,
        category_id: &str,
        description: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let kind = if delta >= Decimal::ZERO {
            TransactionKind::Income {
                wallet_id: wallet_id.to_string(),
                category_id: category_id.to_string(),
            }
        } else {
            TransactionKind::Expense {
                wallet_id: wallet_id.to_string(),
                category_id: category_id.to_string(),
            }
        };
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            amount: delta.abs(),
            currency: currency.to_string(),
            to_amount: None,
            to_currency: None,
            date,
            description,
            tags: Vec::new(),
            is_system: true,
            system_kind: Some(system_kind),
            exchange_rate_used: None,
            exchange_rate_date: None,
            manual_exchange_rate: false,
            base_currency_amount: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input model for creating a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: TransactionKind,
    /// Decimal string in the primary wallet's currency.
    pub amount: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Caller-supplied rate overriding resolution for cross-currency entries.
    #[serde(default, with = "optional_decimal_string")]
    pub manual_exchange_rate: Option<Decimal>,
}

impl NewTransaction {
    /// Validates shape-level constraints (wallets, tags).
    pub fn validate(&self) -> Result<()> {
        validate_kind_and_tags(&self.kind, &self.tags)
    }

    /// Tags trimmed, de-duplicated, order preserved.
    pub fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.tags)
    }
}

/// Input model for replacing a transaction's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub amount: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "optional_decimal_string")]
    pub manual_exchange_rate: Option<Decimal>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Transaction ID is required for updates".to_string(),
            )
            .into());
        }
        validate_kind_and_tags(&self.kind, &self.tags)
    }

    pub fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.tags)
    }
}

fn validate_kind_and_tags(kind: &TransactionKind, tags: &[String]) -> Result<()> {
    if let TransactionKind::Transfer {
        from_wallet_id,
        to_wallet_id,
    } = kind
    {
        if from_wallet_id == to_wallet_id {
            return Err(LedgerError::DistinctWalletsRequired.into());
        }
    }
    if normalize_tags(tags).len() > MAX_TAGS_PER_TRANSACTION {
        return Err(LedgerError::TagLimitExceeded {
            max: MAX_TAGS_PER_TRANSACTION,
        }
        .into());
    }
    Ok(())
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !normalized.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

/// Request to move a wallet to an explicit target balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdjustment {
    /// Decimal string; may be negative for overdraft-capable wallets.
    pub target_balance: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Non-blocking condition surfaced alongside an accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum LedgerWarning {
    /// An overdraft-capable wallet went (or stays) below zero.
    #[serde(rename_all = "camelCase")]
    Overdraft {
        wallet_id: String,
        #[serde(with = "decimal_string")]
        projected_balance: Decimal,
    },
    /// The applied exchange rate predates the transaction.
    #[serde(rename_all = "camelCase")]
    StaleExchangeRate {
        severity: RateSeverity,
        rate_date: NaiveDate,
    },
}

/// Result of an accepted create or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub transaction: Transaction,
    #[serde(default)]
    pub warnings: Vec<LedgerWarning>,
    /// True when an idempotency key matched and the stored result was
    /// returned without re-applying balance effects.
    #[serde(default)]
    pub idempotent_replay: bool,
}

/// Result of a bulk delete; system rows are skipped, not errored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResult {
    pub deleted: usize,
}

/// Outcome of an atomic persist: either a fresh row or a replay hit on an
/// unexpired idempotency key.
#[derive(Debug, Clone)]
pub enum PersistOutcome {
    Created(Transaction),
    Replayed(Transaction),
}

/// Filters for transaction search and report queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub wallet_id: Option<String>,
    /// Storage discriminators (`INCOME`, `EXPENSE`, `TRANSFER`).
    pub kinds: Option<Vec<String>>,
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub include_system: bool,
}

/// Page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearchResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: i64,
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

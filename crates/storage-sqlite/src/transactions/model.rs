//! Database model for ledger transactions.
//!
//! A transfer is one row carrying both wallet references; the signed legs are
//! derived in the domain layer. Tags are stored as a JSON array string.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use pennybook_core::ledger::{
    SystemKind, Transaction, TransactionKind, TRANSACTION_TYPE_EXPENSE, TRANSACTION_TYPE_INCOME,
    TRANSACTION_TYPE_TRANSFER,
};
use pennybook_core::Result;

use crate::errors::StorageError;
use crate::utils::parse_decimal;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub transaction_type: String,
    pub wallet_id: String,
    pub to_wallet_id: Option<String>,
    pub category_id: Option<String>,
    pub amount: String,
    pub currency: String,
    pub to_amount: Option<String>,
    pub to_currency: Option<String>,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub is_system: bool,
    pub system_kind: Option<String>,
    pub exchange_rate_used: Option<String>,
    pub exchange_rate_date: Option<NaiveDate>,
    pub manual_exchange_rate: bool,
    pub base_currency_amount: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TransactionDB {
    pub fn from_domain(transaction: &Transaction) -> Self {
        let (wallet_id, to_wallet_id, category_id) = match &transaction.kind {
            TransactionKind::Income {
                wallet_id,
                category_id,
            }
            | TransactionKind::Expense {
                wallet_id,
                category_id,
            } => (wallet_id.clone(), None, Some(category_id.clone())),
            TransactionKind::Transfer {
                from_wallet_id,
                to_wallet_id,
            } => (from_wallet_id.clone(), Some(to_wallet_id.clone()), None),
        };

        let tags = if transaction.tags.is_empty() {
            None
        } else {
            serde_json::to_string(&transaction.tags).ok()
        };

        Self {
            id: transaction.id.clone(),
            transaction_type: transaction.kind.as_str().to_string(),
            wallet_id,
            to_wallet_id,
            category_id,
            amount: transaction.amount.to_string(),
            currency: transaction.currency.clone(),
            to_amount: transaction.to_amount.map(|d| d.to_string()),
            to_currency: transaction.to_currency.clone(),
            transaction_date: transaction.date,
            description: transaction.description.clone(),
            tags,
            is_system: transaction.is_system,
            system_kind: transaction.system_kind.map(|k| k.as_str().to_string()),
            exchange_rate_used: transaction.exchange_rate_used.map(|d| d.to_string()),
            exchange_rate_date: transaction.exchange_rate_date,
            manual_exchange_rate: transaction.manual_exchange_rate,
            base_currency_amount: transaction.base_currency_amount.map(|d| d.to_string()),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }

    /// Decodes the row into the domain model. Rows that lost a required
    /// reference (a transfer without a destination, an income without a
    /// category) are decode failures, not defaults.
    pub fn into_domain(self) -> Result<Transaction> {
        let kind = match self.transaction_type.as_str() {
            TRANSACTION_TYPE_INCOME => TransactionKind::Income {
                wallet_id: self.wallet_id.clone(),
                category_id: self.category_id.clone().ok_or_else(|| {
                    StorageError::DecodeFailed(format!(
                        "Income transaction {} has no category",
                        self.id
                    ))
                })?,
            },
            TRANSACTION_TYPE_EXPENSE => TransactionKind::Expense {
                wallet_id: self.wallet_id.clone(),
                category_id: self.category_id.clone().ok_or_else(|| {
                    StorageError::DecodeFailed(format!(
                        "Expense transaction {} has no category",
                        self.id
                    ))
                })?,
            },
            TRANSACTION_TYPE_TRANSFER => TransactionKind::Transfer {
                from_wallet_id: self.wallet_id.clone(),
                to_wallet_id: self.to_wallet_id.clone().ok_or_else(|| {
                    StorageError::DecodeFailed(format!(
                        "Transfer transaction {} has no destination wallet",
                        self.id
                    ))
                })?,
            },
            other => {
                return Err(StorageError::DecodeFailed(format!(
                    "Unknown transaction type '{other}' on row {}",
                    self.id
                ))
                .into())
            }
        };

        let tags = match self.tags.as_deref() {
            Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|e| {
                StorageError::DecodeFailed(format!("tags on row {}: {e}", self.id))
            })?,
            None => Vec::new(),
        };

        let system_kind = self
            .system_kind
            .as_deref()
            .map(SystemKind::from_str)
            .transpose()
            .map_err(StorageError::DecodeFailed)?;

        Ok(Transaction {
            id: self.id.clone(),
            kind,
            amount: parse_decimal(&self.amount, "amount")?,
            currency: self.currency,
            to_amount: self
                .to_amount
                .as_deref()
                .map(|v| parse_decimal(v, "to_amount"))
                .transpose()?,
            to_currency: self.to_currency,
            date: self.transaction_date,
            description: self.description,
            tags,
            is_system: self.is_system,
            system_kind,
            exchange_rate_used: self
                .exchange_rate_used
                .as_deref()
                .map(|v| parse_decimal(v, "exchange_rate_used"))
                .transpose()?,
            exchange_rate_date: self.exchange_rate_date,
            manual_exchange_rate: self.manual_exchange_rate,
            base_currency_amount: self
                .base_currency_amount
                .as_deref()
                .map(|v| parse_decimal(v, "base_currency_amount"))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

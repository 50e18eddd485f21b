//! Database model for wallets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use pennybook_core::wallets::{NewWallet, Wallet, WalletType};
use pennybook_core::Result;

use crate::errors::StorageError;
use crate::utils::parse_decimal;

/// Database model for wallets. Monetary columns are TEXT decimal strings.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub id: String,
    pub name: String,
    pub wallet_type: String,
    pub currency: String,
    pub starting_balance: String,
    pub current_balance: String,
    pub include_in_balance: bool,
    pub is_archived: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WalletDB {
    /// Builds the row for a new wallet. The current balance starts equal to
    /// the starting balance; the opening-balance entry's effect is already
    /// baked in.
    pub fn for_insert(new_wallet: NewWallet, starting: Decimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let currency = new_wallet.normalized_currency();
        Self {
            id: new_wallet
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: new_wallet.name.trim().to_string(),
            wallet_type: new_wallet.wallet_type.as_str().to_string(),
            currency,
            starting_balance: starting.to_string(),
            current_balance: starting.to_string(),
            include_in_balance: new_wallet.include_in_balance,
            is_archived: false,
            color: new_wallet.color,
            icon: new_wallet.icon,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decodes the row into the domain model.
    pub fn into_domain(self) -> Result<Wallet> {
        let wallet_type = WalletType::from_str(&self.wallet_type)
            .map_err(StorageError::DecodeFailed)?;
        let starting_balance = parse_decimal(&self.starting_balance, "starting_balance")?;
        let current_balance = parse_decimal(&self.current_balance, "current_balance")?;
        Ok(Wallet {
            id: self.id,
            name: self.name,
            wallet_type,
            currency: self.currency,
            starting_balance,
            current_balance,
            include_in_balance: self.include_in_balance,
            is_archived: self.is_archived,
            color: self.color,
            icon: self.icon,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

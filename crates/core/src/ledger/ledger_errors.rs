//! Ledger-related error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while mutating the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet {0} is archived and cannot accept transactions")]
    WalletArchived(String),

    #[error("A transfer requires two distinct wallets")]
    DistinctWalletsRequired,

    #[error("Overdraft blocked: wallet {wallet_id} would go to {projected_balance}")]
    OverdraftBlocked {
        wallet_id: String,
        projected_balance: Decimal,
    },

    #[error("Exchange rate required for {from_currency}/{to_currency} on {date}")]
    ExchangeRateRequired {
        from_currency: String,
        to_currency: String,
        date: NaiveDate,
    },

    #[error("System transactions cannot be modified or deleted: {0}")]
    SystemTransactionImmutable(String),

    #[error("Transaction date {date} precedes wallet creation on {wallet_created}")]
    DateBeforeWalletCreation {
        date: NaiveDate,
        wallet_created: NaiveDate,
    },

    #[error("A transaction carries at most {max} tags")]
    TagLimitExceeded { max: usize },

    #[error("Ledger consistency violation: {0}")]
    Consistency(String),

    #[error("Invalid transaction data: {0}")]
    InvalidData(String),
}

use async_trait::async_trait;

use super::wallets_model::{NewWallet, Wallet, WalletUpdate};
use crate::errors::Result;
use crate::ledger::Transaction;

/// Trait defining the contract for wallet repository operations.
#[async_trait]
pub trait WalletRepositoryTrait: Send + Sync {
    /// Persists a wallet and, when present, its opening-balance system entry
    /// in one storage transaction.
    async fn create(&self, new_wallet: NewWallet, opening_entry: Option<Transaction>)
        -> Result<Wallet>;

    async fn update(&self, wallet_update: WalletUpdate) -> Result<Wallet>;

    fn get_by_id(&self, wallet_id: &str) -> Result<Wallet>;

    /// Lists wallets, optionally filtered by archived state.
    fn list(&self, archived_filter: Option<bool>) -> Result<Vec<Wallet>>;

    async fn set_archived(&self, wallet_id: &str, archived: bool) -> Result<Wallet>;
}

/// Trait defining the contract for wallet service operations.
#[async_trait]
pub trait WalletServiceTrait: Send + Sync {
    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet>;

    async fn update_wallet(&self, wallet_update: WalletUpdate) -> Result<Wallet>;

    fn get_wallet(&self, wallet_id: &str) -> Result<Wallet>;

    fn list_wallets(&self, archived_filter: Option<bool>) -> Result<Vec<Wallet>>;

    /// Wallets that are not archived.
    fn get_active_wallets(&self) -> Result<Vec<Wallet>>;

    async fn archive_wallet(&self, wallet_id: &str) -> Result<Wallet>;

    async fn restore_wallet(&self, wallet_id: &str) -> Result<Wallet>;
}

use log::debug;
use std::sync::Arc;

use super::wallets_model::{NewWallet, Wallet, WalletUpdate};
use super::wallets_traits::{WalletRepositoryTrait, WalletServiceTrait};
use crate::errors::Result;
use crate::ledger::Transaction;
use rust_decimal::Decimal;

/// Service for managing wallets.
pub struct WalletService {
    repository: Arc<dyn WalletRepositoryTrait>,
}

impl WalletService {
    /// Creates a new WalletService instance
    pub fn new(repository: Arc<dyn WalletRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl WalletServiceTrait for WalletService {
    /// Creates a new wallet. A non-zero starting balance is recorded as an
    /// immutable opening-balance system entry, persisted atomically with the
    /// wallet itself.
    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet> {
        new_wallet.validate()?;
        let starting = new_wallet.starting_balance_decimal()?;
        debug!(
            "Creating wallet '{}' ({}), starting balance {}",
            new_wallet.name, new_wallet.currency, starting
        );

        if starting == Decimal::ZERO {
            return self.repository.create(new_wallet, None).await;
        }

        let wallet_id = new_wallet
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let currency = new_wallet.normalized_currency();
        let today = chrono::Utc::now().date_naive();
        let entry = Transaction::opening_balance(&wallet_id, &currency, starting, today);
        self.repository
            .create(
                NewWallet {
                    id: Some(wallet_id),
                    ..new_wallet
                },
                Some(entry),
            )
            .await
    }

    async fn update_wallet(&self, wallet_update: WalletUpdate) -> Result<Wallet> {
        wallet_update.validate()?;
        self.repository.update(wallet_update).await
    }

    fn get_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        self.repository.get_by_id(wallet_id)
    }

    fn list_wallets(&self, archived_filter: Option<bool>) -> Result<Vec<Wallet>> {
        self.repository.list(archived_filter)
    }

    fn get_active_wallets(&self) -> Result<Vec<Wallet>> {
        self.list_wallets(Some(false))
    }

    async fn archive_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        self.repository.set_archived(wallet_id, true).await
    }

    async fn restore_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        self.repository.set_archived(wallet_id, false).await
    }
}

use async_trait::async_trait;

use super::idempotency::IdempotencyRecord;
use super::ledger_model::{
    BalanceEffect, BulkDeleteResult, NewAdjustment, NewTransaction, PersistOutcome, Transaction,
    TransactionFilters, TransactionOutcome, TransactionSearchResponse, TransactionUpdate,
};
use crate::errors::Result;

/// Trait defining the contract for transaction repository operations.
///
/// The three persist methods are the only ways balance-affecting rows reach
/// the store. Each applies its row mutation and every balance effect in one
/// storage transaction; partial application must be impossible.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    fn search(
        &self,
        filters: &TransactionFilters,
        page: i64,
        page_size: i64,
    ) -> Result<TransactionSearchResponse>;

    /// All transactions matching the filters, unpaginated. Report queries use
    /// this to sum stored base-currency amounts.
    fn list_filtered(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>>;

    fn list_for_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>>;

    /// Distinct tags across all transactions.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Inserts the transaction and applies its balance effects atomically.
    /// When `idempotency` carries a key already stored and unexpired, nothing
    /// is applied and the original transaction is returned as `Replayed`.
    async fn persist_create(
        &self,
        transaction: Transaction,
        effects: Vec<BalanceEffect>,
        idempotency: Option<IdempotencyRecord>,
    ) -> Result<PersistOutcome>;

    /// Replaces the transaction row and applies the merged balance effects
    /// (old effects reversed, new applied) atomically.
    async fn persist_update(
        &self,
        transaction: Transaction,
        effects: Vec<BalanceEffect>,
        idempotency: Option<IdempotencyRecord>,
    ) -> Result<PersistOutcome>;

    /// Deletes the transaction row and applies the reversal effects
    /// atomically. Returns the deleted transaction.
    async fn persist_delete(
        &self,
        transaction_id: &str,
        effects: Vec<BalanceEffect>,
    ) -> Result<Transaction>;
}

/// Trait defining the contract for ledger service operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    fn search_transactions(
        &self,
        filters: &TransactionFilters,
        page: i64,
        page_size: i64,
    ) -> Result<TransactionSearchResponse>;

    fn list_tags(&self) -> Result<Vec<String>>;

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
        idempotency_key: Option<String>,
    ) -> Result<TransactionOutcome>;

    async fn update_transaction(
        &self,
        update: TransactionUpdate,
        idempotency_key: Option<String>,
    ) -> Result<TransactionOutcome>;

    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    /// Deletes the listed transactions, silently skipping system rows and
    /// unknown IDs. Returns how many rows were actually deleted.
    async fn bulk_delete_transactions(&self, transaction_ids: Vec<String>)
        -> Result<BulkDeleteResult>;

    /// Records a balance-adjustment system entry moving the wallet to the
    /// requested target balance.
    async fn adjust_wallet_balance(
        &self,
        wallet_id: &str,
        adjustment: NewAdjustment,
    ) -> Result<TransactionOutcome>;
}

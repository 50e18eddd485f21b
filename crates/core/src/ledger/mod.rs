//! Ledger module - the transaction state machine and wallet balance engine.

mod idempotency;
mod ledger_constants;
mod ledger_errors;
mod ledger_model;
mod ledger_service;
mod ledger_traits;

#[cfg(test)]
mod ledger_model_tests;


pub use idempotency::{validate_idempotency_key, IdempotencyRecord};
pub use ledger_constants::*;
pub use ledger_errors::LedgerError;
pub use ledger_model::{
    BalanceEffect, BulkDeleteResult, LedgerWarning, NewAdjustment, NewTransaction, PersistOutcome,
    SystemKind, Transaction, TransactionFilters, TransactionKind, TransactionOutcome,
    TransactionSearchResponse, TransactionUpdate,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerServiceTrait, TransactionRepositoryTrait};

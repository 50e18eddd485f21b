use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use super::reports_model::{
    DateRange, NetWorthSummary, TotalsFilters, TotalsSummary, WalletScope, WalletValuation,
};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::ledger::{
    TransactionFilters, TransactionKind, TransactionRepositoryTrait, TRANSACTION_TYPE_EXPENSE,
    TRANSACTION_TYPE_INCOME,
};
use crate::wallets::WalletServiceTrait;

/// Trait defining the contract for report queries.
#[async_trait]
pub trait ReportsServiceTrait: Send + Sync {
    /// Income/expense totals over a period in the base currency. Sums the
    /// base-currency amount stored on each transaction rather than
    /// re-resolving rates, so reports stay stable as rates change.
    fn compute_totals(
        &self,
        scope: WalletScope,
        range: DateRange,
        filters: TotalsFilters,
    ) -> Result<TotalsSummary>;

    /// Net worth across non-archived wallets counted toward the balance,
    /// converted at the most recent resolvable rate per request.
    fn net_worth(&self) -> Result<NetWorthSummary>;
}

/// Derives aggregates from the transaction set and wallet balances.
pub struct ReportsService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    wallet_service: Arc<dyn WalletServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    base_currency: Arc<RwLock<String>>,
}

impl ReportsService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        wallet_service: Arc<dyn WalletServiceTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transaction_repository,
            wallet_service,
            fx_service,
            base_currency,
        }
    }

    fn base_currency(&self) -> String {
        self.base_currency.read().unwrap().clone()
    }
}

#[async_trait]
impl ReportsServiceTrait for ReportsService {
    fn compute_totals(
        &self,
        scope: WalletScope,
        range: DateRange,
        filters: TotalsFilters,
    ) -> Result<TotalsSummary> {
        let transaction_filters = TransactionFilters {
            wallet_id: match scope {
                WalletScope::All => None,
                WalletScope::Wallet(id) => Some(id),
            },
            kinds: Some(vec![
                TRANSACTION_TYPE_INCOME.to_string(),
                TRANSACTION_TYPE_EXPENSE.to_string(),
            ]),
            category_id: filters.category_id,
            tags: filters.tags,
            date_from: range.start,
            date_to: range.end,
            include_system: false,
        };

        let transactions = self
            .transaction_repository
            .list_filtered(&transaction_filters)?;

        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for transaction in &transactions {
            let amount = transaction
                .base_currency_amount
                .unwrap_or(transaction.amount);
            match transaction.kind {
                TransactionKind::Income { .. } => income += amount,
                TransactionKind::Expense { .. } => expenses += amount,
                TransactionKind::Transfer { .. } => {}
            }
        }

        Ok(TotalsSummary {
            income,
            expenses,
            net: income - expenses,
            currency: self.base_currency(),
        })
    }

    fn net_worth(&self) -> Result<NetWorthSummary> {
        let base = self.base_currency();
        let wallets = self.wallet_service.get_active_wallets()?;

        let mut total = Decimal::ZERO;
        let mut valuations = Vec::new();
        let mut skipped_wallet_ids = Vec::new();

        for wallet in wallets {
            if !wallet.include_in_balance {
                continue;
            }
            let base_value = if wallet.currency == base {
                Some(wallet.current_balance)
            } else {
                match self
                    .fx_service
                    .convert_latest(wallet.current_balance, &wallet.currency, &base)
                {
                    Ok(value) => Some(value.round_dp(DECIMAL_PRECISION)),
                    Err(e) => {
                        warn!(
                            "Net worth: no usable {}/{} rate for wallet {} ({})",
                            wallet.currency, base, wallet.id, e
                        );
                        skipped_wallet_ids.push(wallet.id.clone());
                        None
                    }
                }
            };
            if let Some(value) = base_value {
                total += value;
            }
            valuations.push(WalletValuation {
                wallet_id: wallet.id,
                name: wallet.name,
                currency: wallet.currency,
                balance: wallet.current_balance,
                base_value,
            });
        }

        Ok(NetWorthSummary {
            total,
            currency: base,
            valuations,
            skipped_wallet_ids,
        })
    }
}

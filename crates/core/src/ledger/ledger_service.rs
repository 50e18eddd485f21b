use chrono::{Duration, NaiveDate, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use super::idempotency::{validate_idempotency_key, IdempotencyRecord};
use super::ledger_errors::LedgerError;
use super::ledger_model::{
    BalanceEffect, BulkDeleteResult, LedgerWarning, NewAdjustment, NewTransaction, PersistOutcome,
    Transaction, TransactionFilters, TransactionKind, TransactionOutcome,
    TransactionSearchResponse, TransactionUpdate,
};
use super::ledger_traits::{LedgerServiceTrait, TransactionRepositoryTrait};
use crate::amounts::{exceeds_max_amount, max_amount_string, validate_amount, AmountError};
use crate::amounts::validate_signed_amount;
use crate::categories::CategoryServiceTrait;
use crate::constants::{DECIMAL_PRECISION, DEFAULT_IDEMPOTENCY_TTL_HOURS};
use crate::currencies::minor_unit_exponent;
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::fx::{FxServiceTrait, RateSeverity};
use crate::wallets::{Wallet, WalletServiceTrait};

/// The transaction state machine.
///
/// Every balance-affecting mutation flows through this service: it validates
/// the request, resolves cross-currency rates, enforces the overdraft policy,
/// and hands the repository one atomic unit of row mutation plus balance
/// effects. Idempotency keys replay the original result instead of
/// re-applying effects.
pub struct LedgerService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    wallet_service: Arc<dyn WalletServiceTrait>,
    category_service: Arc<dyn CategoryServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    base_currency: Arc<RwLock<String>>,
    idempotency_ttl: Duration,
}

/// Monetary fields of a validated entry, ready to persist.
struct PreparedEntry {
    amount: Decimal,
    currency: String,
    to_amount: Option<Decimal>,
    to_currency: Option<String>,
    exchange_rate_used: Option<Decimal>,
    exchange_rate_date: Option<NaiveDate>,
    manual_exchange_rate: bool,
    base_currency_amount: Option<Decimal>,
    warnings: Vec<LedgerWarning>,
}

impl LedgerService {
    /// Creates a new LedgerService instance with injected dependencies
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        wallet_service: Arc<dyn WalletServiceTrait>,
        category_service: Arc<dyn CategoryServiceTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transaction_repository,
            wallet_service,
            category_service,
            fx_service,
            base_currency,
            idempotency_ttl: Duration::hours(DEFAULT_IDEMPOTENCY_TTL_HOURS),
        }
    }

    /// Overrides the idempotency-key TTL for this service.
    pub fn with_idempotency_ttl(mut self, ttl: Duration) -> Self {
        self.idempotency_ttl = ttl;
        self
    }

    fn base_currency(&self) -> String {
        self.base_currency.read().unwrap().clone()
    }

    /// Loads a wallet that must accept new transactions.
    fn require_active_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        let wallet = self.require_wallet(wallet_id)?;
        if wallet.is_archived {
            return Err(LedgerError::WalletArchived(wallet_id.to_string()).into());
        }
        Ok(wallet)
    }

    fn require_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        match self.wallet_service.get_wallet(wallet_id) {
            Ok(wallet) => Ok(wallet),
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                Err(LedgerError::WalletNotFound(wallet_id.to_string()).into())
            }
            Err(e) => Err(e),
        }
    }

    fn check_wallet_date(wallet: &Wallet, date: NaiveDate) -> Result<()> {
        let wallet_created = wallet.created_at.date();
        if date < wallet_created {
            return Err(LedgerError::DateBeforeWalletCreation {
                date,
                wallet_created,
            }
            .into());
        }
        Ok(())
    }

    /// Categories on user transactions must exist and must not be system
    /// categories; those are reserved for engine-generated entries.
    fn require_user_category(&self, category_id: &str) -> Result<()> {
        let category = match self.category_service.get_category(category_id) {
            Ok(c) => c,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(
                    LedgerError::InvalidData(format!("Category {category_id} not found")).into(),
                )
            }
            Err(e) => return Err(e),
        };
        if category.is_system {
            return Err(LedgerError::InvalidData(format!(
                "Category '{}' is reserved for system entries",
                category.name
            ))
            .into());
        }
        Ok(())
    }

    /// The rate applied to a cross-currency leg: a positive manual override,
    /// or the resolver's fallback. Critical staleness without a manual rate
    /// blocks the request.
    fn applied_rate(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
        manual_rate: Option<Decimal>,
    ) -> Result<(Decimal, NaiveDate, bool, Vec<LedgerWarning>)> {
        if let Some(rate) = manual_rate {
            if rate <= Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Manual exchange rate must be positive".to_string(),
                )));
            }
            return Ok((rate, date, true, Vec::new()));
        }

        let resolution = self.fx_service.resolve_rate(from, to, date)?;
        if resolution.requires_manual_input {
            return Err(LedgerError::ExchangeRateRequired {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                date,
            }
            .into());
        }
        let rate = resolution
            .rate
            .ok_or_else(|| LedgerError::Consistency("Resolved rate carries no value".to_string()))?;
        let rate_date = resolution.rate_date.unwrap_or(date);

        let mut warnings = Vec::new();
        if resolution.severity != RateSeverity::None {
            warnings.push(LedgerWarning::StaleExchangeRate {
                severity: resolution.severity,
                rate_date,
            });
        }
        Ok((rate, rate_date, false, warnings))
    }

    /// Validates a request's wallets, category, amount, and currency legs.
    fn prepare_entry(
        &self,
        kind: &TransactionKind,
        amount: &str,
        date: NaiveDate,
        manual_rate: Option<Decimal>,
    ) -> Result<PreparedEntry> {
        let base = self.base_currency();
        match kind {
            TransactionKind::Income {
                wallet_id,
                category_id,
            }
            | TransactionKind::Expense {
                wallet_id,
                category_id,
            } => {
                let wallet = self.require_active_wallet(wallet_id)?;
                Self::check_wallet_date(&wallet, date)?;
                self.require_user_category(category_id)?;
                let amount = validate_amount(amount, &wallet.currency)?;

                if wallet.currency == base {
                    return Ok(PreparedEntry {
                        amount,
                        currency: wallet.currency,
                        to_amount: None,
                        to_currency: None,
                        exchange_rate_used: None,
                        exchange_rate_date: None,
                        manual_exchange_rate: false,
                        base_currency_amount: Some(amount),
                        warnings: Vec::new(),
                    });
                }

                let (rate, rate_date, manual, warnings) =
                    self.applied_rate(&wallet.currency, &base, date, manual_rate)?;
                let base_amount = (amount * rate).round_dp(DECIMAL_PRECISION);
                Ok(PreparedEntry {
                    amount,
                    currency: wallet.currency,
                    to_amount: None,
                    to_currency: None,
                    exchange_rate_used: Some(rate),
                    exchange_rate_date: Some(rate_date),
                    manual_exchange_rate: manual,
                    base_currency_amount: Some(base_amount),
                    warnings,
                })
            }
            TransactionKind::Transfer {
                from_wallet_id,
                to_wallet_id,
            } => {
                let from_wallet = self.require_active_wallet(from_wallet_id)?;
                let to_wallet = self.require_active_wallet(to_wallet_id)?;
                Self::check_wallet_date(&from_wallet, date)?;
                Self::check_wallet_date(&to_wallet, date)?;
                let amount = validate_amount(amount, &from_wallet.currency)?;

                if from_wallet.currency == to_wallet.currency {
                    let base_amount = (from_wallet.currency == base).then_some(amount);
                    return Ok(PreparedEntry {
                        amount,
                        currency: from_wallet.currency,
                        to_amount: None,
                        to_currency: None,
                        exchange_rate_used: None,
                        exchange_rate_date: None,
                        manual_exchange_rate: false,
                        base_currency_amount: base_amount,
                        warnings: Vec::new(),
                    });
                }

                let (rate, rate_date, manual, warnings) = self.applied_rate(
                    &from_wallet.currency,
                    &to_wallet.currency,
                    date,
                    manual_rate,
                )?;
                let exponent = minor_unit_exponent(&to_wallet.currency)
                    .ok_or_else(|| Error::UnsupportedCurrency(to_wallet.currency.clone()))?;
                let to_amount = (amount * rate).round_dp(exponent);
                if exceeds_max_amount(&to_amount.to_string(), &to_wallet.currency)? {
                    return Err(AmountError::ExceedsMaximum {
                        max: max_amount_string(&to_wallet.currency)?,
                    }
                    .into());
                }

                let base_currency_amount = if from_wallet.currency == base {
                    Some(amount)
                } else if to_wallet.currency == base {
                    Some(to_amount)
                } else {
                    None
                };

                Ok(PreparedEntry {
                    amount,
                    currency: from_wallet.currency,
                    to_amount: Some(to_amount),
                    to_currency: Some(to_wallet.currency),
                    exchange_rate_used: Some(rate),
                    exchange_rate_date: Some(rate_date),
                    manual_exchange_rate: manual,
                    base_currency_amount,
                    warnings,
                })
            }
        }
    }

    /// Applies the overdraft policy to a set of net balance effects. Cash
    /// wallets hard-block; overdraft-capable wallets produce a warning.
    fn check_overdraft(&self, effects: &[BalanceEffect]) -> Result<Vec<LedgerWarning>> {
        let mut warnings = Vec::new();
        for effect in effects {
            if effect.delta >= Decimal::ZERO {
                continue;
            }
            let wallet = self.require_wallet(&effect.wallet_id)?;
            let projected = wallet.current_balance + effect.delta;
            if projected < Decimal::ZERO {
                if wallet.wallet_type.allows_overdraft() {
                    warnings.push(LedgerWarning::Overdraft {
                        wallet_id: wallet.id,
                        projected_balance: projected,
                    });
                } else {
                    return Err(LedgerError::OverdraftBlocked {
                        wallet_id: wallet.id,
                        projected_balance: projected,
                    }
                    .into());
                }
            }
        }
        Ok(warnings)
    }

    fn idempotency_record(
        &self,
        key: Option<String>,
        transaction_id: &str,
    ) -> Result<Option<IdempotencyRecord>> {
        match key {
            Some(key) => {
                validate_idempotency_key(&key)?;
                Ok(Some(IdempotencyRecord::new(
                    key.trim().to_string(),
                    transaction_id.to_string(),
                    self.idempotency_ttl,
                )))
            }
            None => Ok(None),
        }
    }

    fn clean_description(description: Option<String>) -> Option<String> {
        description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
    }
}

/// Sums effects per wallet and drops the zeros, so the repository applies at
/// most one balance update per wallet.
fn merge_effects(effects: impl IntoIterator<Item = BalanceEffect>) -> Vec<BalanceEffect> {
    let mut merged: Vec<BalanceEffect> = Vec::new();
    for effect in effects {
        match merged.iter_mut().find(|e| e.wallet_id == effect.wallet_id) {
            Some(existing) => existing.delta += effect.delta,
            None => merged.push(effect),
        }
    }
    merged.retain(|e| !e.delta.is_zero());
    merged
}

#[async_trait::async_trait]
impl LedgerServiceTrait for LedgerService {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.transaction_repository.get_transaction(transaction_id)
    }

    fn search_transactions(
        &self,
        filters: &TransactionFilters,
        page: i64,
        page_size: i64,
    ) -> Result<TransactionSearchResponse> {
        self.transaction_repository.search(filters, page, page_size)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.transaction_repository.list_tags()
    }

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
        idempotency_key: Option<String>,
    ) -> Result<TransactionOutcome> {
        new_transaction.validate()?;
        let prepared = self.prepare_entry(
            &new_transaction.kind,
            &new_transaction.amount,
            new_transaction.date,
            new_transaction.manual_exchange_rate,
        )?;

        let now = Utc::now().naive_utc();
        let transaction = Transaction {
            id: new_transaction
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            kind: new_transaction.kind.clone(),
            amount: prepared.amount,
            currency: prepared.currency,
            to_amount: prepared.to_amount,
            to_currency: prepared.to_currency,
            date: new_transaction.date,
            tags: new_transaction.normalized_tags(),
            description: Self::clean_description(new_transaction.description),
            is_system: false,
            system_kind: None,
            exchange_rate_used: prepared.exchange_rate_used,
            exchange_rate_date: prepared.exchange_rate_date,
            manual_exchange_rate: prepared.manual_exchange_rate,
            base_currency_amount: prepared.base_currency_amount,
            created_at: now,
            updated_at: now,
        };

        let effects = merge_effects(transaction.signed_effects());
        let mut warnings = prepared.warnings;
        warnings.extend(self.check_overdraft(&effects)?);
        let record = self.idempotency_record(idempotency_key, &transaction.id)?;

        debug!(
            "Creating {} transaction {} ({} {})",
            transaction.kind.as_str(),
            transaction.id,
            transaction.amount,
            transaction.currency
        );
        match self
            .transaction_repository
            .persist_create(transaction, effects, record)
            .await?
        {
            PersistOutcome::Created(transaction) => Ok(TransactionOutcome {
                transaction,
                warnings,
                idempotent_replay: false,
            }),
            PersistOutcome::Replayed(transaction) => {
                debug!("Idempotency key replay for transaction {}", transaction.id);
                Ok(TransactionOutcome {
                    transaction,
                    warnings: Vec::new(),
                    idempotent_replay: true,
                })
            }
        }
    }

    async fn update_transaction(
        &self,
        update: TransactionUpdate,
        idempotency_key: Option<String>,
    ) -> Result<TransactionOutcome> {
        update.validate()?;
        let existing = self.transaction_repository.get_transaction(&update.id)?;
        if existing.is_system {
            return Err(LedgerError::SystemTransactionImmutable(existing.id).into());
        }

        let prepared =
            self.prepare_entry(&update.kind, &update.amount, update.date, update.manual_exchange_rate)?;

        let updated = Transaction {
            id: existing.id.clone(),
            kind: update.kind.clone(),
            amount: prepared.amount,
            currency: prepared.currency,
            to_amount: prepared.to_amount,
            to_currency: prepared.to_currency,
            date: update.date,
            tags: update.normalized_tags(),
            description: Self::clean_description(update.description),
            is_system: false,
            system_kind: None,
            exchange_rate_used: prepared.exchange_rate_used,
            exchange_rate_date: prepared.exchange_rate_date,
            manual_exchange_rate: prepared.manual_exchange_rate,
            base_currency_amount: prepared.base_currency_amount,
            created_at: existing.created_at,
            updated_at: Utc::now().naive_utc(),
        };

        // Reverse the old effect, apply the new one, net per wallet.
        let effects = merge_effects(
            existing
                .reverse_effects()
                .into_iter()
                .chain(updated.signed_effects()),
        );
        let mut warnings = prepared.warnings;
        warnings.extend(self.check_overdraft(&effects)?);
        let record = self.idempotency_record(idempotency_key, &updated.id)?;

        match self
            .transaction_repository
            .persist_update(updated, effects, record)
            .await?
        {
            PersistOutcome::Created(transaction) => Ok(TransactionOutcome {
                transaction,
                warnings,
                idempotent_replay: false,
            }),
            PersistOutcome::Replayed(transaction) => Ok(TransactionOutcome {
                transaction,
                warnings: Vec::new(),
                idempotent_replay: true,
            }),
        }
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let existing = self.transaction_repository.get_transaction(transaction_id)?;
        if existing.is_system {
            return Err(LedgerError::SystemTransactionImmutable(existing.id).into());
        }

        let effects = merge_effects(existing.reverse_effects());
        for warning in self.check_overdraft(&effects)? {
            debug!("Deleting transaction {} with {:?}", transaction_id, warning);
        }
        self.transaction_repository
            .persist_delete(transaction_id, effects)
            .await
    }

    async fn bulk_delete_transactions(
        &self,
        transaction_ids: Vec<String>,
    ) -> Result<BulkDeleteResult> {
        let mut deleted = 0;
        for transaction_id in transaction_ids {
            let existing = match self.transaction_repository.get_transaction(&transaction_id) {
                Ok(transaction) => transaction,
                Err(Error::Database(DatabaseError::NotFound(_))) => {
                    debug!("Bulk delete: {} not found, skipping", transaction_id);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if existing.is_system {
                debug!("Bulk delete: {} is a system entry, skipping", transaction_id);
                continue;
            }

            let effects = merge_effects(existing.reverse_effects());
            match self.check_overdraft(&effects) {
                Ok(_) => {}
                Err(Error::Ledger(LedgerError::OverdraftBlocked { wallet_id, .. })) => {
                    warn!(
                        "Bulk delete: skipping {}, reversal would overdraw cash wallet {}",
                        transaction_id, wallet_id
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }

            self.transaction_repository
                .persist_delete(&transaction_id, effects)
                .await?;
            deleted += 1;
        }
        Ok(BulkDeleteResult { deleted })
    }

    async fn adjust_wallet_balance(
        &self,
        wallet_id: &str,
        adjustment: NewAdjustment,
    ) -> Result<TransactionOutcome> {
        let wallet = self.require_active_wallet(wallet_id)?;
        let target = validate_signed_amount(&adjustment.target_balance, &wallet.currency)?;
        if target < Decimal::ZERO && !wallet.wallet_type.allows_overdraft() {
            return Err(LedgerError::OverdraftBlocked {
                wallet_id: wallet.id,
                projected_balance: target,
            }
            .into());
        }

        let today = Utc::now().date_naive();
        if adjustment.date > today {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Adjustment date cannot be in the future".to_string(),
            )));
        }
        Self::check_wallet_date(&wallet, adjustment.date)?;

        let delta = target - wallet.current_balance;
        if delta.is_zero() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Wallet balance already matches the requested target".to_string(),
            )));
        }

        debug!(
            "Adjusting wallet {} from {} to {} (delta {})",
            wallet.id, wallet.current_balance, target, delta
        );
        let transaction = Transaction::balance_adjustment(
            &wallet.id,
            &wallet.currency,
            delta,
            adjustment.date,
            Self::clean_description(adjustment.description),
        );
        let effects = transaction.signed_effects();

        match self
            .transaction_repository
            .persist_create(transaction, effects, None)
            .await?
        {
            PersistOutcome::Created(transaction) => Ok(TransactionOutcome {
                transaction,
                warnings: Vec::new(),
                idempotent_replay: false,
            }),
            PersistOutcome::Replayed(_) => Err(LedgerError::Consistency(
                "Balance adjustment unexpectedly hit an idempotency key".to_string(),
            )
            .into()),
        }
    }
}

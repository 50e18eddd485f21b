use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

use pennybook_core::errors::{DatabaseError, Error, Result};
use pennybook_core::ledger::{
    BalanceEffect, IdempotencyRecord, LedgerError, PersistOutcome, Transaction,
    TransactionFilters, TransactionRepositoryTrait, TransactionSearchResponse,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{idempotency_keys, transactions, wallets};
use crate::utils::parse_decimal;

use super::model::TransactionDB;

/// Repository for transaction rows, their balance effects, and idempotency
/// keys. The persist methods run on the writer actor, so each one is a single
/// immediate transaction: row mutation, balance updates, and key bookkeeping
/// commit or roll back together.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn filtered_query(filters: &TransactionFilters) -> transactions::BoxedQuery<'static, Sqlite> {
    let mut query = transactions::table.into_boxed();

    if let Some(wallet) = &filters.wallet_id {
        query = query.filter(
            transactions::wallet_id
                .eq(wallet.clone())
                .or(transactions::to_wallet_id.eq(wallet.clone())),
        );
    }
    if let Some(kinds) = &filters.kinds {
        query = query.filter(transactions::transaction_type.eq_any(kinds.clone()));
    }
    if let Some(category) = &filters.category_id {
        query = query.filter(transactions::category_id.eq(category.clone()));
    }
    if let Some(tags) = &filters.tags {
        // Tags are a JSON array string; match on the quoted element.
        for tag in tags {
            query = query.filter(transactions::tags.like(format!("%\"{}\"%", tag)));
        }
    }
    if let Some(from) = filters.date_from {
        query = query.filter(transactions::transaction_date.ge(from));
    }
    if let Some(to) = filters.date_to {
        query = query.filter(transactions::transaction_date.le(to));
    }
    if !filters.include_system {
        query = query.filter(transactions::is_system.eq(false));
    }

    query
}

fn load_row(conn: &mut SqliteConnection, transaction_id: &str) -> Result<Transaction> {
    transactions::table
        .find(transaction_id)
        .first::<TransactionDB>(conn)
        .into_core()?
        .into_domain()
}

/// Applies signed balance deltas to the cached wallet balances. A missing
/// wallet here means the ledger and wallet tables disagree; the whole write
/// rolls back.
fn apply_effects(conn: &mut SqliteConnection, effects: &[BalanceEffect]) -> Result<()> {
    let now = chrono::Utc::now().naive_utc();
    for effect in effects {
        let balance_str = wallets::table
            .find(&effect.wallet_id)
            .select(wallets::current_balance)
            .first::<String>(conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Ledger(LedgerError::Consistency(format!(
                    "Balance effect references missing wallet {}",
                    effect.wallet_id
                )))
            })?;

        let new_balance = parse_decimal(&balance_str, "current_balance")? + effect.delta;
        diesel::update(wallets::table.find(&effect.wallet_id))
            .set((
                wallets::current_balance.eq(new_balance.to_string()),
                wallets::updated_at.eq(now),
            ))
            .execute(conn)
            .into_core()?;
    }
    Ok(())
}

/// Check-and-set for an idempotency key, inside the caller's transaction.
///
/// Expired keys are evicted first. A live key short-circuits to the
/// transaction it produced; a live key whose transaction has since been
/// deleted is dropped and the request treated as fresh. Otherwise the key is
/// stored so a racing retry of the same request replays instead of
/// re-applying.
fn check_and_store_key(
    conn: &mut SqliteConnection,
    record: &IdempotencyRecord,
) -> Result<Option<Transaction>> {
    let now = chrono::Utc::now().naive_utc();
    diesel::delete(idempotency_keys::table.filter(idempotency_keys::expires_at.le(now)))
        .execute(conn)
        .into_core()?;

    let existing = idempotency_keys::table
        .find(&record.key)
        .select(idempotency_keys::transaction_id)
        .first::<String>(conn)
        .optional()
        .into_core()?;

    if let Some(transaction_id) = existing {
        match load_row(conn, &transaction_id) {
            Ok(transaction) => return Ok(Some(transaction)),
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                debug!(
                    "Idempotency key {} points at deleted transaction {}, evicting",
                    record.key, transaction_id
                );
                diesel::delete(idempotency_keys::table.find(&record.key))
                    .execute(conn)
                    .into_core()?;
            }
            Err(e) => return Err(e),
        }
    }

    diesel::insert_into(idempotency_keys::table)
        .values((
            idempotency_keys::idempotency_key.eq(&record.key),
            idempotency_keys::transaction_id.eq(&record.transaction_id),
            idempotency_keys::created_at.eq(record.created_at),
            idempotency_keys::expires_at.eq(record.expires_at),
        ))
        .execute(conn)
        .into_core()?;
    Ok(None)
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        load_row(&mut conn, transaction_id)
    }

    fn search(
        &self,
        filters: &TransactionFilters,
        page: i64,
        page_size: i64,
    ) -> Result<TransactionSearchResponse> {
        let mut conn = get_connection(&self.pool)?;

        let total_count = filtered_query(filters)
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;

        let page = page.max(1);
        let page_size = page_size.clamp(1, 500);
        let rows = filtered_query(filters)
            .order((
                transactions::transaction_date.desc(),
                transactions::created_at.desc(),
            ))
            .limit(page_size)
            .offset((page - 1) * page_size)
            .load::<TransactionDB>(&mut conn)
            .into_core()?;

        let transactions = rows
            .into_iter()
            .map(TransactionDB::into_domain)
            .collect::<Result<Vec<_>>>()?;

        Ok(TransactionSearchResponse {
            transactions,
            total_count,
        })
    }

    fn list_filtered(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = filtered_query(filters)
            .order((
                transactions::transaction_date.asc(),
                transactions::created_at.asc(),
            ))
            .load::<TransactionDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(TransactionDB::into_domain).collect()
    }

    fn list_for_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        self.list_filtered(&TransactionFilters {
            wallet_id: Some(wallet_id.to_string()),
            include_system: true,
            ..Default::default()
        })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        let raw: Vec<Option<String>> = transactions::table
            .select(transactions::tags)
            .filter(transactions::tags.is_not_null())
            .load::<Option<String>>(&mut conn)
            .into_core()?;

        let mut tags = BTreeSet::new();
        for entry in raw.into_iter().flatten() {
            if let Ok(parsed) = serde_json::from_str::<Vec<String>>(&entry) {
                tags.extend(parsed);
            }
        }
        Ok(tags.into_iter().collect())
    }

    async fn persist_create(
        &self,
        transaction: Transaction,
        effects: Vec<BalanceEffect>,
        idempotency: Option<IdempotencyRecord>,
    ) -> Result<PersistOutcome> {
        self.writer
            .exec(move |conn| {
                if let Some(record) = &idempotency {
                    if let Some(replayed) = check_and_store_key(conn, record)? {
                        return Ok(PersistOutcome::Replayed(replayed));
                    }
                }

                let row = TransactionDB::from_domain(&transaction);
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;

                apply_effects(conn, &effects)?;
                Ok(PersistOutcome::Created(transaction))
            })
            .await
    }

    async fn persist_update(
        &self,
        transaction: Transaction,
        effects: Vec<BalanceEffect>,
        idempotency: Option<IdempotencyRecord>,
    ) -> Result<PersistOutcome> {
        self.writer
            .exec(move |conn| {
                if let Some(record) = &idempotency {
                    if let Some(replayed) = check_and_store_key(conn, record)? {
                        return Ok(PersistOutcome::Replayed(replayed));
                    }
                }

                let row = TransactionDB::from_domain(&transaction);
                let updated = diesel::update(transactions::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Transaction {} not found",
                        row.id
                    ))));
                }

                apply_effects(conn, &effects)?;
                Ok(PersistOutcome::Created(transaction))
            })
            .await
    }

    async fn persist_delete(
        &self,
        transaction_id: &str,
        effects: Vec<BalanceEffect>,
    ) -> Result<Transaction> {
        let transaction_id = transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let existing = load_row(conn, &transaction_id)?;

                diesel::delete(transactions::table.find(&transaction_id))
                    .execute(conn)
                    .into_core()?;
                diesel::delete(
                    idempotency_keys::table
                        .filter(idempotency_keys::transaction_id.eq(&transaction_id)),
                )
                .execute(conn)
                .into_core()?;

                apply_effects(conn, &effects)?;
                Ok(existing)
            })
            .await
    }
}

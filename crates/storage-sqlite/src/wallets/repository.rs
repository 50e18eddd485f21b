use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use pennybook_core::ledger::Transaction;
use pennybook_core::wallets::{NewWallet, Wallet, WalletRepositoryTrait, WalletUpdate};
use pennybook_core::errors::{DatabaseError, Error, Result};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::wallets;
use crate::transactions::TransactionDB;

use super::model::WalletDB;

/// Repository for managing wallet rows and their cached balances.
pub struct WalletRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WalletRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl WalletRepositoryTrait for WalletRepository {
    /// Inserts the wallet and, when present, its opening-balance entry in one
    /// write transaction. The cached balance starts at the starting balance,
    /// so the opening entry carries no separate effect.
    async fn create(
        &self,
        new_wallet: NewWallet,
        opening_entry: Option<Transaction>,
    ) -> Result<Wallet> {
        let starting = new_wallet.starting_balance_decimal()?;
        self.writer
            .exec(move |conn| {
                let wallet_db = WalletDB::for_insert(new_wallet, starting);

                diesel::insert_into(wallets::table)
                    .values(&wallet_db)
                    .execute(conn)
                    .into_core()?;

                if let Some(entry) = opening_entry {
                    let entry_db = TransactionDB::from_domain(&entry);
                    diesel::insert_into(crate::schema::transactions::table)
                        .values(&entry_db)
                        .execute(conn)
                        .into_core()?;
                }

                wallet_db.into_domain()
            })
            .await
    }

    async fn update(&self, wallet_update: WalletUpdate) -> Result<Wallet> {
        self.writer
            .exec(move |conn| {
                let wallet_id = wallet_update.id.clone().ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound("Wallet ID missing".to_string()))
                })?;

                let mut existing = wallets::table
                    .select(WalletDB::as_select())
                    .find(&wallet_id)
                    .first::<WalletDB>(conn)
                    .into_core()?;

                existing.name = wallet_update.name.trim().to_string();
                existing.include_in_balance = wallet_update.include_in_balance;
                existing.color = wallet_update.color;
                existing.icon = wallet_update.icon;
                existing.updated_at = chrono::Utc::now().naive_utc();

                diesel::update(wallets::table.find(&wallet_id))
                    .set(&existing)
                    .execute(conn)
                    .into_core()?;

                existing.into_domain()
            })
            .await
    }

    fn get_by_id(&self, wallet_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)?;

        wallets::table
            .select(WalletDB::as_select())
            .find(wallet_id)
            .first::<WalletDB>(&mut conn)
            .into_core()?
            .into_domain()
    }

    fn list(&self, archived_filter: Option<bool>) -> Result<Vec<Wallet>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = wallets::table.into_boxed();
        if let Some(archived) = archived_filter {
            query = query.filter(wallets::is_archived.eq(archived));
        }

        let rows = query
            .select(WalletDB::as_select())
            .order(wallets::name.asc())
            .load::<WalletDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(WalletDB::into_domain).collect()
    }

    async fn set_archived(&self, wallet_id: &str, archived: bool) -> Result<Wallet> {
        let wallet_id = wallet_id.to_string();
        self.writer
            .exec(move |conn| {
                let updated = diesel::update(wallets::table.find(&wallet_id))
                    .set((
                        wallets::is_archived.eq(archived),
                        wallets::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Wallet {wallet_id} not found"
                    ))));
                }

                wallets::table
                    .select(WalletDB::as_select())
                    .find(&wallet_id)
                    .first::<WalletDB>(conn)
                    .into_core()?
                    .into_domain()
            })
            .await
    }
}

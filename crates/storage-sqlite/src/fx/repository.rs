use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use pennybook_core::errors::{DatabaseError, Error, Result};
use pennybook_core::fx::{ExchangeRate, FxRepositoryTrait, NewExchangeRate};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::exchange_rates;

use super::model::ExchangeRateDB;

/// Repository for the sparse historical exchange-rate table.
#[derive(Clone)]
pub struct FxRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FxRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl FxRepositoryTrait for FxRepository {
    fn get_rate_on(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        exchange_rates::table
            .filter(exchange_rates::from_currency.eq(from))
            .filter(exchange_rates::to_currency.eq(to))
            .filter(exchange_rates::rate_date.eq(date))
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .into_core()?
            .map(ExchangeRateDB::into_domain)
            .transpose()
    }

    fn get_latest_rate_on_or_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        exchange_rates::table
            .filter(exchange_rates::from_currency.eq(from))
            .filter(exchange_rates::to_currency.eq(to))
            .filter(exchange_rates::rate_date.le(date))
            .order(exchange_rates::rate_date.desc())
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .into_core()?
            .map(ExchangeRateDB::into_domain)
            .transpose()
    }

    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        exchange_rates::table
            .filter(exchange_rates::from_currency.eq(from))
            .filter(exchange_rates::to_currency.eq(to))
            .order(exchange_rates::rate_date.desc())
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .into_core()?
            .map(ExchangeRateDB::into_domain)
            .transpose()
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = exchange_rates::table
            .order((
                exchange_rates::from_currency.asc(),
                exchange_rates::to_currency.asc(),
                exchange_rates::rate_date.desc(),
            ))
            .load::<ExchangeRateDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(ExchangeRateDB::into_domain).collect()
    }

    /// Upserts on (pair, date): re-entering a rate for a day replaces it.
    async fn save_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        self.writer
            .exec(move |conn| {
                let row = ExchangeRateDB::for_insert(&new_rate);

                diesel::insert_into(exchange_rates::table)
                    .values(&row)
                    .on_conflict((
                        exchange_rates::from_currency,
                        exchange_rates::to_currency,
                        exchange_rates::rate_date,
                    ))
                    .do_update()
                    .set((
                        exchange_rates::rate.eq(&row.rate),
                        exchange_rates::source.eq(&row.source),
                    ))
                    .execute(conn)
                    .into_core()?;

                exchange_rates::table
                    .filter(exchange_rates::from_currency.eq(&row.from_currency))
                    .filter(exchange_rates::to_currency.eq(&row.to_currency))
                    .filter(exchange_rates::rate_date.eq(row.rate_date))
                    .first::<ExchangeRateDB>(conn)
                    .into_core()?
                    .into_domain()
            })
            .await
    }

    async fn delete_rate(&self, rate_id: &str) -> Result<()> {
        let rate_id = rate_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(exchange_rates::table.find(&rate_id))
                    .execute(conn)
                    .into_core()?;
                if deleted == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Exchange rate {rate_id} not found"
                    ))));
                }
                Ok(())
            })
            .await
    }
}

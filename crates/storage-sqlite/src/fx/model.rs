//! Database model for stored exchange rates.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use pennybook_core::fx::{ExchangeRate, NewExchangeRate, RateSource};
use pennybook_core::Result;

use crate::errors::StorageError;
use crate::utils::parse_decimal;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateDB {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: String,
    pub rate_date: NaiveDate,
    pub source: String,
    pub created_at: NaiveDateTime,
}

impl ExchangeRateDB {
    pub fn for_insert(new_rate: &NewExchangeRate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from_currency: new_rate.from_currency.trim().to_uppercase(),
            to_currency: new_rate.to_currency.trim().to_uppercase(),
            rate: new_rate.rate.to_string(),
            rate_date: new_rate.rate_date,
            source: new_rate.source.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn into_domain(self) -> Result<ExchangeRate> {
        let source = RateSource::from_str(&self.source).map_err(StorageError::DecodeFailed)?;
        Ok(ExchangeRate {
            id: self.id,
            from_currency: self.from_currency,
            to_currency: self.to_currency,
            rate: parse_decimal(&self.rate, "rate")?,
            rate_date: self.rate_date,
            source,
            created_at: self.created_at,
        })
    }
}

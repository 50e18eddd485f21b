use super::fx_model::{ExchangeRate, NewExchangeRate, RateResolution};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait defining the contract for FX repository operations.
#[async_trait]
pub trait FxRepositoryTrait: Send + Sync {
    /// Rate stored for exactly this pair and date.
    fn get_rate_on(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<ExchangeRate>>;

    /// Most recent rate for this pair dated on or before `date`.
    fn get_latest_rate_on_or_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>>;

    /// Most recent rate for this pair regardless of date.
    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;

    fn list_rates(&self) -> Result<Vec<ExchangeRate>>;

    async fn save_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;

    async fn delete_rate(&self, rate_id: &str) -> Result<()>;
}

/// Trait defining the contract for FX service operations.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    /// Resolves the rate applicable to a transaction dated `date`, with
    /// staleness classification and fallback to the most recent prior rate.
    fn resolve_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<RateResolution>;

    /// Most recent resolvable rate for the pair, for read-time valuation.
    fn get_latest_exchange_rate(&self, from: &str, to: &str) -> Result<Decimal>;

    /// Converts an amount at the most recent resolvable rate.
    fn convert_latest(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal>;

    fn list_rates(&self) -> Result<Vec<ExchangeRate>>;

    async fn add_manual_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;

    async fn delete_rate(&self, rate_id: &str) -> Result<()>;
}

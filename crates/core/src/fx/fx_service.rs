use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use super::fx_model::{
    ExchangeRate, NewExchangeRate, RateResolution, RateSeverity, ResolverThresholds,
};
use super::fx_traits::{FxRepositoryTrait, FxServiceTrait};
use crate::errors::Result;

/// Resolves historical exchange rates with a staleness policy.
///
/// Stored rates are sparse; when no rate exists for the requested date the
/// resolver walks backward to the most recent prior rate inside the lookback
/// window and classifies its age. Inverse pairs qualify with the reciprocal
/// rate.
pub struct FxService {
    repository: Arc<dyn FxRepositoryTrait>,
    thresholds: ResolverThresholds,
}

impl FxService {
    pub fn new(repository: Arc<dyn FxRepositoryTrait>) -> Self {
        Self {
            repository,
            thresholds: ResolverThresholds::default(),
        }
    }

    /// Overrides the staleness thresholds for this service.
    pub fn with_thresholds(mut self, thresholds: ResolverThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn validate_code(code: &str) -> Result<()> {
        if code.len() != 3 || !code.chars().all(|c| c.is_alphabetic()) {
            return Err(FxError::InvalidCurrencyCode(code.to_string()).into());
        }
        Ok(())
    }

    /// Rate stored for exactly this date, trying the inverse pair as a
    /// reciprocal when no direct rate exists.
    fn rate_on(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<(Decimal, NaiveDate)>> {
        if let Some(rate) = self.repository.get_rate_on(from, to, date)? {
            return Ok(Some((rate.rate, rate.rate_date)));
        }
        if let Some(inverse) = self.repository.get_rate_on(to, from, date)? {
            if !inverse.rate.is_zero() {
                return Ok(Some((Decimal::ONE / inverse.rate, inverse.rate_date)));
            }
        }
        Ok(None)
    }

    /// Most recent prior rate inside the lookback window, direct or inverse.
    /// When both pairs have candidates the fresher date wins; a tie goes to
    /// the direct pair.
    fn latest_rate_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<(Decimal, NaiveDate)>> {
        let floor = date - Duration::days(self.thresholds.lookback_days);

        let direct = self
            .repository
            .get_latest_rate_on_or_before(from, to, date)?
            .filter(|r| r.rate_date >= floor)
            .map(|r| (r.rate, r.rate_date));

        let inverse = self
            .repository
            .get_latest_rate_on_or_before(to, from, date)?
            .filter(|r| r.rate_date >= floor && !r.rate.is_zero())
            .map(|r| (Decimal::ONE / r.rate, r.rate_date));

        Ok(match (direct, inverse) {
            (Some(d), Some(i)) => {
                if i.1 > d.1 {
                    Some(i)
                } else {
                    Some(d)
                }
            }
            (Some(d), None) => Some(d),
            (None, Some(i)) => Some(i),
            (None, None) => None,
        })
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    fn resolve_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<RateResolution> {
        Self::validate_code(from)?;
        Self::validate_code(to)?;

        if from.eq_ignore_ascii_case(to) {
            return Ok(RateResolution::exact(Decimal::ONE, date));
        }

        if let Some((rate, rate_date)) = self.rate_on(from, to, date)? {
            return Ok(RateResolution::exact(rate, rate_date));
        }

        match self.latest_rate_before(from, to, date)? {
            Some((rate, rate_date)) => {
                let age_days = (date - rate_date).num_days();
                let severity = self.thresholds.classify(age_days);
                if severity == RateSeverity::Old {
                    warn!(
                        "Exchange rate for {}/{} on {} falls back to {} ({} days old)",
                        from, to, date, rate_date, age_days
                    );
                } else {
                    debug!(
                        "Exchange rate for {}/{} on {} falls back to {} ({} days old)",
                        from, to, date, rate_date, age_days
                    );
                }
                Ok(RateResolution::stale(rate, rate_date, severity))
            }
            None => {
                warn!(
                    "No exchange rate found for {}/{} within {} days of {}",
                    from, to, self.thresholds.lookback_days, date
                );
                Ok(RateResolution::missing())
            }
        }
    }

    fn get_latest_exchange_rate(&self, from: &str, to: &str) -> Result<Decimal> {
        Self::validate_code(from)?;
        Self::validate_code(to)?;

        if from.eq_ignore_ascii_case(to) {
            return Ok(Decimal::ONE);
        }

        if let Some(rate) = self.repository.get_latest_rate(from, to)? {
            return Ok(rate.rate);
        }
        if let Some(inverse) = self.repository.get_latest_rate(to, from)? {
            if !inverse.rate.is_zero() {
                return Ok(Decimal::ONE / inverse.rate);
            }
        }
        Err(FxError::RateNotFound(format!("Exchange rate not found for {}/{}", from, to)).into())
    }

    fn convert_latest(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }
        let rate = self.get_latest_exchange_rate(from, to)?;
        Ok(amount * rate)
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        self.repository.list_rates()
    }

    async fn add_manual_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        new_rate.validate()?;
        self.repository.save_rate(new_rate).await
    }

    async fn delete_rate(&self, rate_id: &str) -> Result<()> {
        self.repository.delete_rate(rate_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::fx::{
        ExchangeRate, FxError, FxRepositoryTrait, FxService, FxServiceTrait, NewExchangeRate,
        RateResolution, RateSeverity, RateSource, ResolverThresholds,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    // --- Mock FxRepository ---
    #[derive(Clone, Default)]
    struct MockFxRepository {
        rates: Arc<Mutex<Vec<ExchangeRate>>>,
    }

    impl MockFxRepository {
        fn new() -> Self {
            Self::default()
        }

        fn add_rate(&self, from: &str, to: &str, date: NaiveDate, rate: &str) {
            let mut rates = self.rates.lock().unwrap();
            let id = format!("rate-{}", rates.len());
            rates.push(ExchangeRate {
                id,
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate: Decimal::from_str(rate).unwrap(),
                rate_date: date,
                source: RateSource::Manual,
                created_at: date.and_hms_opt(0, 0, 0).unwrap(),
            });
        }
    }

    #[async_trait]
    impl FxRepositoryTrait for MockFxRepository {
        fn get_rate_on(
            &self,
            from: &str,
            to: &str,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRate>> {
            Ok(self
                .rates
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.from_currency == from && r.to_currency == to && r.rate_date == date)
                .cloned())
        }

        fn get_latest_rate_on_or_before(
            &self,
            from: &str,
            to: &str,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRate>> {
            Ok(self
                .rates
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.from_currency == from && r.to_currency == to && r.rate_date <= date)
                .max_by_key(|r| r.rate_date)
                .cloned())
        }

        fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
            Ok(self
                .rates
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.from_currency == from && r.to_currency == to)
                .max_by_key(|r| r.rate_date)
                .cloned())
        }

        fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
            Ok(self.rates.lock().unwrap().clone())
        }

        async fn save_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
            self.add_rate(
                &new_rate.from_currency,
                &new_rate.to_currency,
                new_rate.rate_date,
                &new_rate.rate.to_string(),
            );
            Ok(self.rates.lock().unwrap().last().unwrap().clone())
        }

        async fn delete_rate(&self, rate_id: &str) -> Result<()> {
            self.rates.lock().unwrap().retain(|r| r.id != rate_id);
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_with_repo() -> (FxService, MockFxRepository) {
        let repo = MockFxRepository::new();
        let service = FxService::new(Arc::new(repo.clone()));
        (service, repo)
    }

    fn resolve(service: &FxService, date: NaiveDate) -> RateResolution {
        service.resolve_rate("EUR", "USD", date).unwrap()
    }

    #[test]
    fn test_same_currency_is_exact_unit_rate() {
        let (service, _) = service_with_repo();
        let resolution = service.resolve_rate("USD", "USD", date(2025, 3, 10)).unwrap();
        assert!(resolution.exact_match);
        assert_eq!(resolution.rate, Some(Decimal::ONE));
        assert_eq!(resolution.severity, RateSeverity::None);
    }

    #[test]
    fn test_exact_date_match() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 3, 10), "1.08");

        let resolution = resolve(&service, date(2025, 3, 10));
        assert!(resolution.exact_match);
        assert_eq!(resolution.severity, RateSeverity::None);
        assert_eq!(resolution.rate_date, Some(date(2025, 3, 10)));
        assert!(!resolution.requires_manual_input);
    }

    #[test]
    fn test_five_day_old_rate_is_recent() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 3, 5), "1.07");

        let resolution = resolve(&service, date(2025, 3, 10));
        assert!(!resolution.exact_match);
        assert_eq!(resolution.severity, RateSeverity::Recent);
        assert_eq!(resolution.rate_date, Some(date(2025, 3, 5)));
    }

    #[test]
    fn test_ten_day_old_rate_is_outdated() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 3, 1), "1.06");

        let resolution = resolve(&service, date(2025, 3, 11));
        assert_eq!(resolution.severity, RateSeverity::Outdated);
        assert!(!resolution.requires_manual_input);
    }

    #[test]
    fn test_thirty_five_day_old_rate_is_old() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 2, 1), "1.05");

        let resolution = resolve(&service, date(2025, 3, 8));
        assert_eq!(resolution.severity, RateSeverity::Old);
        assert_eq!(resolution.rate_date, Some(date(2025, 2, 1)));
    }

    #[test]
    fn test_nothing_inside_lookback_is_critical() {
        let (service, repo) = service_with_repo();
        // 70 days before the transaction date, outside the 60-day lookback
        repo.add_rate("EUR", "USD", date(2025, 1, 1), "1.04");

        let resolution = resolve(&service, date(2025, 3, 12));
        assert_eq!(resolution.severity, RateSeverity::Critical);
        assert!(resolution.requires_manual_input);
        assert_eq!(resolution.rate, None);
        assert_eq!(resolution.rate_date, None);
    }

    #[test]
    fn test_custom_lookback_threshold() {
        let repo = MockFxRepository::new();
        repo.add_rate("EUR", "USD", date(2025, 1, 1), "1.04");
        let service = FxService::new(Arc::new(repo)).with_thresholds(ResolverThresholds {
            recent_days: 7,
            outdated_days: 30,
            lookback_days: 90,
        });

        let resolution = resolve(&service, date(2025, 3, 12));
        assert_eq!(resolution.severity, RateSeverity::Old);
        assert_eq!(resolution.rate_date, Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_inverse_pair_qualifies_with_reciprocal() {
        let (service, repo) = service_with_repo();
        repo.add_rate("USD", "EUR", date(2025, 3, 10), "0.8");

        let resolution = resolve(&service, date(2025, 3, 10));
        assert!(resolution.exact_match);
        assert_eq!(resolution.rate, Some(Decimal::from_str("1.25").unwrap()));
    }

    #[test]
    fn test_fresher_inverse_beats_staler_direct() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 3, 1), "1.06");
        repo.add_rate("USD", "EUR", date(2025, 3, 8), "0.9259");

        let resolution = resolve(&service, date(2025, 3, 10));
        assert_eq!(resolution.rate_date, Some(date(2025, 3, 8)));
        assert_eq!(resolution.severity, RateSeverity::Recent);
    }

    #[test]
    fn test_latest_rate_for_valuation() {
        let (service, repo) = service_with_repo();
        repo.add_rate("EUR", "USD", date(2025, 2, 1), "1.05");
        repo.add_rate("EUR", "USD", date(2025, 3, 1), "1.10");

        let rate = service.get_latest_exchange_rate("EUR", "USD").unwrap();
        assert_eq!(rate, Decimal::from_str("1.10").unwrap());
    }

    #[test]
    fn test_missing_pair_errors_on_valuation() {
        let (service, _) = service_with_repo();
        let err = service.get_latest_exchange_rate("EUR", "USD").unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::RateNotFound(_))));
    }

    #[test]
    fn test_invalid_currency_code_rejected() {
        let (service, _) = service_with_repo();
        let err = service
            .resolve_rate("E1R", "USD", date(2025, 3, 10))
            .unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::InvalidCurrencyCode(_))));
    }

    #[tokio::test]
    async fn test_manual_rate_requires_valid_pair() {
        let (service, _) = service_with_repo();
        let err = service
            .add_manual_rate(NewExchangeRate {
                from_currency: "USD".to_string(),
                to_currency: "USD".to_string(),
                rate: Decimal::ONE,
                rate_date: date(2025, 3, 10),
                source: RateSource::Manual,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::InvalidRate(_))));
    }
}

//! Property-based tests for the ledger's pure building blocks.
//!
//! These verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use pennybook_core::amounts::{exceeds_max_amount, max_amount_string, validate_amount};
use pennybook_core::currencies::minor_unit_exponent;
use pennybook_core::fx::{RateSeverity, ResolverThresholds};
use pennybook_core::ledger::{Transaction, TransactionKind};

// =============================================================================
// Generators
// =============================================================================

/// Currencies covering every minor-unit exponent in the registry.
const CURRENCIES: &[&str] = &["USD", "EUR", "JPY", "BHD", "CLF"];

fn arb_currency() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(CURRENCIES)
}

/// Generates a valid amount string for the currency: 1-15 integer digits and
/// at most the currency's exponent of fractional digits.
fn arb_valid_amount(currency: &'static str) -> impl Strategy<Value = String> {
    let exponent = minor_unit_exponent(currency).unwrap() as usize;
    ("[1-9][0-9]{0,14}", proptest::collection::vec(0u8..10, 0..=exponent)).prop_map(
        |(integer, frac_digits)| {
            if frac_digits.is_empty() {
                integer
            } else {
                let fraction: String = frac_digits.iter().map(|d| d.to_string()).collect();
                format!("{integer}.{fraction}")
            }
        },
    )
}

fn arb_kind() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Income {
            wallet_id: "w-a".to_string(),
            category_id: "c-1".to_string(),
        }),
        Just(TransactionKind::Expense {
            wallet_id: "w-a".to_string(),
            category_id: "c-1".to_string(),
        }),
        Just(TransactionKind::Transfer {
            from_wallet_id: "w-a".to_string(),
            to_wallet_id: "w-b".to_string(),
        }),
    ]
}

fn transaction_with(kind: TransactionKind, amount: Decimal, to_amount: Option<Decimal>) -> Transaction {
    let now = chrono::Utc::now().naive_utc();
    Transaction {
        id: "txn-1".to_string(),
        kind,
        amount,
        currency: "USD".to_string(),
        to_amount,
        to_currency: None,
        date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        description: None,
        tags: Vec::new(),
        is_system: false,
        system_kind: None,
        exchange_rate_used: None,
        exchange_rate_date: None,
        manual_exchange_rate: false,
        base_currency_amount: None,
        created_at: now,
        updated_at: now,
    }
}

fn severity_rank(severity: RateSeverity) -> u8 {
    match severity {
        RateSeverity::None => 0,
        RateSeverity::Recent => 1,
        RateSeverity::Outdated => 2,
        RateSeverity::Old => 3,
        RateSeverity::Critical => 4,
    }
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any amount with at most 15 integer digits and exponent-bounded
    /// fractional digits validates and round-trips through `Decimal`.
    #[test]
    fn prop_bounded_amounts_validate(
        (currency, amount) in arb_currency().prop_flat_map(|c| (Just(c), arb_valid_amount(c)))
    ) {
        let parsed = validate_amount(&amount, currency);
        prop_assert!(parsed.is_ok(), "{amount} should validate for {currency}");
        prop_assert_eq!(parsed.unwrap(), Decimal::from_str(&amount).unwrap());
        prop_assert!(!exceeds_max_amount(&amount, currency).unwrap());
    }

    /// Sixteen integer digits always exceed the column maximum.
    #[test]
    fn prop_sixteen_digit_amounts_exceed(
        currency in arb_currency(),
        integer in "[1-9][0-9]{15}"
    ) {
        prop_assert!(exceeds_max_amount(&integer, currency).unwrap());
        prop_assert!(validate_amount(&integer, currency).is_err());
    }

    /// The currency's max string validates, and one more minor unit does not.
    #[test]
    fn prop_max_amount_round_trip(currency in arb_currency()) {
        let max = max_amount_string(currency).unwrap();
        prop_assert!(!exceeds_max_amount(&max, currency).unwrap());
        prop_assert!(validate_amount(&max, currency).is_ok());

        // Incrementing the max carries into a sixteenth integer digit
        let above = format!("1{}", "0".repeat(15));
        prop_assert!(exceeds_max_amount(&above, currency).unwrap());
    }

    /// Reversal exactly cancels a transaction's signed effects, wallet by
    /// wallet. This is the algebra behind delete and update.
    #[test]
    fn prop_reverse_effects_cancel(
        kind in arb_kind(),
        cents in 1u64..1_000_000_000,
        to_cents in proptest::option::of(1u64..1_000_000_000)
    ) {
        let amount = Decimal::new(cents as i64, 2);
        let to_amount = match &kind {
            TransactionKind::Transfer { .. } => to_cents.map(|c| Decimal::new(c as i64, 2)),
            _ => None,
        };
        let transaction = transaction_with(kind, amount, to_amount);

        let mut net: std::collections::HashMap<String, Decimal> = std::collections::HashMap::new();
        for effect in transaction.signed_effects().into_iter().chain(transaction.reverse_effects()) {
            *net.entry(effect.wallet_id).or_insert(Decimal::ZERO) += effect.delta;
        }
        for (wallet_id, delta) in net {
            prop_assert_eq!(delta, Decimal::ZERO, "wallet {} not cancelled", wallet_id);
        }
    }

    /// A same-currency transfer conserves value across its two legs.
    #[test]
    fn prop_same_currency_transfer_conserves_value(cents in 1u64..1_000_000_000) {
        let amount = Decimal::new(cents as i64, 2);
        let transaction = transaction_with(
            TransactionKind::Transfer {
                from_wallet_id: "w-a".to_string(),
                to_wallet_id: "w-b".to_string(),
            },
            amount,
            None,
        );
        let total: Decimal = transaction.signed_effects().iter().map(|e| e.delta).sum();
        prop_assert_eq!(total, Decimal::ZERO);
    }

    /// Staleness never decreases as the fallback rate gets older.
    #[test]
    fn prop_severity_monotone_in_age(age_a in 0i64..120, age_b in 0i64..120) {
        let thresholds = ResolverThresholds::default();
        let (younger, older) = if age_a <= age_b { (age_a, age_b) } else { (age_b, age_a) };
        prop_assert!(
            severity_rank(thresholds.classify(younger)) <= severity_rank(thresholds.classify(older))
        );
    }
}

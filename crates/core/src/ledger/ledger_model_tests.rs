#[cfg(test)]
mod tests {
    use crate::ledger::{NewTransaction, SystemKind, Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_kind_serde_uses_transaction_type_tag() {
        let kind = TransactionKind::Transfer {
            from_wallet_id: "w-1".to_string(),
            to_wallet_id: "w-2".to_string(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["transactionType"], "transfer");
        assert_eq!(json["fromWalletId"], "w-1");
        assert_eq!(json["toWalletId"], "w-2");

        let parsed: TransactionKind = serde_json::from_str(
            r#"{"transactionType":"income","walletId":"w-9","categoryId":"c-1"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            TransactionKind::Income {
                wallet_id: "w-9".to_string(),
                category_id: "c-1".to_string(),
            }
        );
    }

    #[test]
    fn test_new_transaction_amount_stays_a_string_on_the_wire() {
        let request: NewTransaction = serde_json::from_str(
            r#"{
                "transactionType": "expense",
                "walletId": "w-1",
                "categoryId": "c-1",
                "amount": "19.99",
                "date": "2025-06-01"
            }"#,
        )
        .unwrap();
        assert_eq!(request.amount, "19.99");
        assert_eq!(request.date, date(2025, 6, 1));
    }

    #[test]
    fn test_signed_effects_per_kind() {
        let entry = Transaction::opening_balance("w-1", "USD", dec("100"), date(2025, 1, 1));
        assert_eq!(entry.signed_effects().len(), 1);
        assert_eq!(entry.signed_effects()[0].delta, dec("100"));

        let mut transfer = entry.clone();
        transfer.kind = TransactionKind::Transfer {
            from_wallet_id: "w-1".to_string(),
            to_wallet_id: "w-2".to_string(),
        };
        transfer.amount = dec("30");
        transfer.to_amount = Some(dec("33"));
        let effects = transfer.signed_effects();
        assert_eq!(effects[0].delta, dec("-30"));
        assert_eq!(effects[1].delta, dec("33"));

        let reversed = transfer.reverse_effects();
        assert_eq!(reversed[0].delta, dec("30"));
        assert_eq!(reversed[1].delta, dec("-33"));
    }

    #[test]
    fn test_opening_balance_sign_picks_the_shape() {
        let positive = Transaction::opening_balance("w-1", "USD", dec("100"), date(2025, 1, 1));
        assert!(positive.is_system);
        assert_eq!(positive.system_kind, Some(SystemKind::InitialBalance));
        assert_eq!(positive.kind.as_str(), "INCOME");
        assert_eq!(positive.amount, dec("100"));

        let negative = Transaction::balance_adjustment(
            "w-1",
            "USD",
            dec("-25.50"),
            date(2025, 1, 2),
            None,
        );
        assert_eq!(negative.kind.as_str(), "EXPENSE");
        assert_eq!(negative.amount, dec("25.50"));
        assert_eq!(negative.system_kind, Some(SystemKind::BalanceAdjustment));
    }
}

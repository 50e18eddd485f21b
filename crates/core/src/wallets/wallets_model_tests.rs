#[cfg(test)]
mod tests {
    use crate::wallets::{NewWallet, WalletType, WalletUpdate};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn new_wallet(wallet_type: WalletType, starting_balance: Option<&str>) -> NewWallet {
        NewWallet {
            id: None,
            name: "Groceries cash".to_string(),
            wallet_type,
            currency: "USD".to_string(),
            starting_balance: starting_balance.map(str::to_string),
            include_in_balance: true,
            color: None,
            icon: None,
        }
    }

    #[test]
    fn test_valid_wallet_passes() {
        let wallet = new_wallet(WalletType::Cash, Some("100.50"));
        assert!(wallet.validate().is_ok());
        assert_eq!(
            wallet.starting_balance_decimal().unwrap(),
            Decimal::from_str("100.50").unwrap()
        );
    }

    #[test]
    fn test_missing_starting_balance_defaults_to_zero() {
        let wallet = new_wallet(WalletType::Bank, None);
        assert!(wallet.validate().is_ok());
        assert_eq!(wallet.starting_balance_decimal().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut wallet = new_wallet(WalletType::Bank, None);
        wallet.name = "   ".to_string();
        assert!(wallet.validate().is_err());
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let mut wallet = new_wallet(WalletType::Bank, None);
        wallet.currency = "XXX".to_string();
        assert!(wallet.validate().is_err());
    }

    #[test]
    fn test_cash_wallet_cannot_start_negative() {
        let wallet = new_wallet(WalletType::Cash, Some("-10"));
        assert!(wallet.validate().is_err());

        let bank = new_wallet(WalletType::Bank, Some("-10"));
        assert!(bank.validate().is_ok());
    }

    #[test]
    fn test_starting_balance_respects_currency_exponent() {
        let mut wallet = new_wallet(WalletType::Bank, Some("10.555"));
        assert!(wallet.validate().is_err());
        wallet.currency = "BHD".to_string();
        assert!(wallet.validate().is_ok());
    }

    #[test]
    fn test_overdraft_policy_per_type() {
        assert!(!WalletType::Cash.allows_overdraft());
        assert!(WalletType::Bank.allows_overdraft());
        assert!(WalletType::DigitalWallet.allows_overdraft());
    }

    #[test]
    fn test_update_requires_id_and_name() {
        let update = WalletUpdate {
            id: None,
            name: "Checking".to_string(),
            include_in_balance: true,
            color: None,
            icon: None,
        };
        assert!(update.validate().is_err());

        let update = WalletUpdate {
            id: Some("w-1".to_string()),
            name: "".to_string(),
            include_in_balance: true,
            color: None,
            icon: None,
        };
        assert!(update.validate().is_err());
    }
}

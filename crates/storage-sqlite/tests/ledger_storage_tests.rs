//! End-to-end tests wiring the core services to the real SQLite storage.
//!
//! Each test opens its own database in a temp directory, runs the embedded
//! migrations, and drives the services exactly as the server does.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use pennybook_core::categories::{CategoryService, CategoryServiceTrait, NewCategory};
use pennybook_core::errors::Error;
use pennybook_core::fx::{FxService, FxServiceTrait, NewExchangeRate, RateSource, RateSeverity};
use pennybook_core::ledger::{
    LedgerError, LedgerService, LedgerServiceTrait, LedgerWarning, NewAdjustment, NewTransaction,
    Transaction, TransactionKind, TransactionRepositoryTrait,
};
use pennybook_core::settings::{SettingsRepositoryTrait, SettingsService, SettingsServiceTrait};
use pennybook_core::wallets::{NewWallet, WalletService, WalletServiceTrait, WalletType};
use pennybook_storage_sqlite::categories::CategoryRepository;
use pennybook_storage_sqlite::db::{self, write_actor};
use pennybook_storage_sqlite::fx::FxRepository;
use pennybook_storage_sqlite::settings::SettingsRepository;
use pennybook_storage_sqlite::transactions::TransactionRepository;
use pennybook_storage_sqlite::wallets::WalletRepository;

struct TestApp {
    // Holds the temp dir open for the lifetime of the test.
    _dir: TempDir,
    wallet_service: Arc<WalletService>,
    category_service: Arc<CategoryService>,
    fx_service: Arc<FxService>,
    ledger_service: Arc<LedgerService>,
    settings_repository: Arc<SettingsRepository>,
    transaction_repository: Arc<TransactionRepository>,
    base_currency: Arc<RwLock<String>>,
}

fn build_app() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = db::init(dir.path().to_str().unwrap()).expect("db init");
    let pool = db::create_pool(&db_path).expect("pool");
    db::run_migrations(&pool).expect("migrations");
    let writer = write_actor::spawn_writer((*pool).clone());

    let wallet_repository = Arc::new(WalletRepository::new(pool.clone(), writer.clone()));
    let category_repository = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let fx_repository = Arc::new(FxRepository::new(pool.clone(), writer.clone()));
    let settings_repository = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));

    let base_currency = Arc::new(RwLock::new("USD".to_string()));
    let wallet_service = Arc::new(WalletService::new(wallet_repository));
    let category_service = Arc::new(CategoryService::new(category_repository));
    let fx_service = Arc::new(FxService::new(fx_repository));
    let ledger_service = Arc::new(LedgerService::new(
        transaction_repository.clone(),
        wallet_service.clone(),
        category_service.clone(),
        fx_service.clone(),
        base_currency.clone(),
    ));

    TestApp {
        _dir: dir,
        wallet_service,
        category_service,
        fx_service,
        ledger_service,
        settings_repository,
        transaction_repository,
        base_currency,
    }
}

async fn create_wallet(app: &TestApp, name: &str, wallet_type: WalletType, currency: &str,
    starting: &str) -> String {
    app.wallet_service
        .create_wallet(NewWallet {
            id: None,
            name: name.to_string(),
            wallet_type,
            currency: currency.to_string(),
            starting_balance: Some(starting.to_string()),
            include_in_balance: true,
            color: None,
            icon: None,
        })
        .await
        .expect("create wallet")
        .id
}

async fn create_category(app: &TestApp, name: &str) -> String {
    app.category_service
        .create_category(NewCategory {
            id: None,
            name: name.to_string(),
        })
        .await
        .expect("create category")
        .id
}

fn balance(app: &TestApp, wallet_id: &str) -> Decimal {
    app.wallet_service
        .get_wallet(wallet_id)
        .expect("get wallet")
        .current_balance
}

fn wallet_history(app: &TestApp, wallet_id: &str) -> Vec<Transaction> {
    app.transaction_repository
        .list_for_wallet(wallet_id)
        .expect("history")
}

#[tokio::test]
async fn test_wallet_creation_records_opening_balance() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Pocket", WalletType::Cash, "USD", "100").await;

    assert_eq!(balance(&app, &wallet_id), dec!(100));

    let history = wallet_history(&app, &wallet_id);
    assert_eq!(history.len(), 1);
    assert!(history[0].is_system);
    assert_eq!(history[0].amount, dec!(100));
}

#[tokio::test]
async fn test_cash_overdraft_blocked_and_balance_unchanged() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Pocket", WalletType::Cash, "USD", "100").await;
    let category_id = create_category(&app, "Groceries").await;

    let result = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Expense {
                    wallet_id: wallet_id.clone(),
                    category_id,
                },
                amount: "150".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::OverdraftBlocked { .. }))
    ));
    assert_eq!(balance(&app, &wallet_id), dec!(100));
}

#[tokio::test]
async fn test_bank_overdraft_allowed_with_warning() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Checking", WalletType::Bank, "USD", "100").await;
    let category_id = create_category(&app, "Rent").await;

    let outcome = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Expense {
                    wallet_id: wallet_id.clone(),
                    category_id,
                },
                amount: "150".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await
        .expect("bank overdraft accepted");

    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, LedgerWarning::Overdraft { .. })));
    assert_eq!(balance(&app, &wallet_id), dec!(-50));
}

#[tokio::test]
async fn test_idempotent_replay_applies_once() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Pocket", WalletType::Cash, "USD", "100").await;
    let category_id = create_category(&app, "Salary").await;

    let request = NewTransaction {
        id: None,
        kind: TransactionKind::Income {
            wallet_id: wallet_id.clone(),
            category_id,
        },
        amount: "25".to_string(),
        date: Utc::now().date_naive(),
        description: Some("payout".to_string()),
        tags: Vec::new(),
        manual_exchange_rate: None,
    };

    let first = app
        .ledger_service
        .create_transaction(request.clone(), Some("retry-1".to_string()))
        .await
        .expect("first submit");
    let second = app
        .ledger_service
        .create_transaction(request, Some("retry-1".to_string()))
        .await
        .expect("replayed submit");

    assert!(!first.idempotent_replay);
    assert!(second.idempotent_replay);
    assert_eq!(first.transaction.id, second.transaction.id);
    assert_eq!(balance(&app, &wallet_id), dec!(125));

    let history = wallet_history(&app, &wallet_id);
    // Opening balance plus exactly one income row.
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_cross_currency_transfer_uses_fallback_rate() {
    let app = build_app();
    let eur_wallet = create_wallet(&app, "Euros", WalletType::Bank, "EUR", "500").await;
    let usd_wallet = create_wallet(&app, "Dollars", WalletType::Bank, "USD", "100").await;

    let today = Utc::now().date_naive();
    app.fx_service
        .add_manual_rate(NewExchangeRate {
            from_currency: "EUR".to_string(),
            to_currency: "USD".to_string(),
            rate: dec!(1.10),
            rate_date: today - Duration::days(5),
            source: RateSource::Manual,
        })
        .await
        .expect("store rate");

    let outcome = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Transfer {
                    from_wallet_id: eur_wallet.clone(),
                    to_wallet_id: usd_wallet.clone(),
                },
                amount: "50".to_string(),
                date: today,
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await
        .expect("transfer accepted");

    let transaction = &outcome.transaction;
    assert_eq!(transaction.exchange_rate_date, Some(today - Duration::days(5)));
    assert_eq!(transaction.to_amount, Some(dec!(55.00)));
    assert!(outcome.warnings.iter().any(|w| matches!(
        w,
        LedgerWarning::StaleExchangeRate {
            severity: RateSeverity::Recent,
            ..
        }
    )));

    assert_eq!(balance(&app, &eur_wallet), dec!(450));
    assert_eq!(balance(&app, &usd_wallet), dec!(155.00));
}

#[tokio::test]
async fn test_update_rewires_balances_atomically() {
    let app = build_app();
    let wallet_a = create_wallet(&app, "A", WalletType::Bank, "USD", "100").await;
    let wallet_b = create_wallet(&app, "B", WalletType::Bank, "USD", "100").await;
    let category_id = create_category(&app, "Dining").await;

    let created = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Expense {
                    wallet_id: wallet_a.clone(),
                    category_id: category_id.clone(),
                },
                amount: "40".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await
        .expect("create");
    assert_eq!(balance(&app, &wallet_a), dec!(60));

    // Move the expense to the other wallet and change the amount.
    app.ledger_service
        .update_transaction(
            pennybook_core::ledger::TransactionUpdate {
                id: created.transaction.id.clone(),
                kind: TransactionKind::Expense {
                    wallet_id: wallet_b.clone(),
                    category_id,
                },
                amount: "10".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await
        .expect("update");

    assert_eq!(balance(&app, &wallet_a), dec!(100));
    assert_eq!(balance(&app, &wallet_b), dec!(90));
}

#[tokio::test]
async fn test_bulk_delete_skips_system_rows() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Pocket", WalletType::Cash, "USD", "100").await;
    let category_id = create_category(&app, "Misc").await;

    let created = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Income {
                    wallet_id: wallet_id.clone(),
                    category_id,
                },
                amount: "10".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await
        .expect("create");

    let history = wallet_history(&app, &wallet_id);
    let system_id = history
        .iter()
        .find(|t| t.is_system)
        .map(|t| t.id.clone())
        .expect("opening entry");

    let result = app
        .ledger_service
        .bulk_delete_transactions(vec![created.transaction.id.clone(), system_id.clone()])
        .await
        .expect("bulk delete");

    assert_eq!(result.deleted, 1);
    assert_eq!(balance(&app, &wallet_id), dec!(100));
    assert!(wallet_history(&app, &wallet_id)
        .iter()
        .any(|t| t.id == system_id));
}

#[tokio::test]
async fn test_balance_adjustment_moves_to_target() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Pocket", WalletType::Cash, "USD", "100").await;

    let outcome = app
        .ledger_service
        .adjust_wallet_balance(
            &wallet_id,
            NewAdjustment {
                target_balance: "75.50".to_string(),
                date: Utc::now().date_naive(),
                description: Some("count correction".to_string()),
            },
        )
        .await
        .expect("adjustment");

    assert!(outcome.transaction.is_system);
    assert_eq!(outcome.transaction.amount, dec!(24.50));
    assert_eq!(balance(&app, &wallet_id), dec!(75.50));
}

#[tokio::test]
async fn test_archived_wallet_rejects_transactions() {
    let app = build_app();
    let wallet_id = create_wallet(&app, "Old", WalletType::Bank, "USD", "0").await;
    let category_id = create_category(&app, "Misc").await;

    app.wallet_service
        .archive_wallet(&wallet_id)
        .await
        .expect("archive");

    let result = app
        .ledger_service
        .create_transaction(
            NewTransaction {
                id: None,
                kind: TransactionKind::Income {
                    wallet_id: wallet_id.clone(),
                    category_id,
                },
                amount: "10".to_string(),
                date: Utc::now().date_naive(),
                description: None,
                tags: Vec::new(),
                manual_exchange_rate: None,
            },
            None,
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::WalletArchived(_)))
    ));

    app.wallet_service
        .restore_wallet(&wallet_id)
        .await
        .expect("restore");
    assert!(!app
        .wallet_service
        .get_wallet(&wallet_id)
        .expect("get")
        .is_archived);
}

#[tokio::test]
async fn test_settings_store_round_trip() {
    let app = build_app();
    let settings_service = SettingsService::new(
        app.settings_repository.clone(),
        app.base_currency.clone(),
    );

    // Unset key falls back to the default base currency.
    assert_eq!(settings_service.get_base_currency().expect("default"), "USD");

    settings_service
        .update_base_currency("eur")
        .await
        .expect("update");
    assert_eq!(settings_service.get_base_currency().expect("stored"), "EUR");
    assert_eq!(*app.base_currency.read().unwrap(), "EUR");

    assert!(app.settings_repository.get_setting("missing-key").is_err());
}

#[tokio::test]
async fn test_system_categories_hidden_from_user_listing() {
    let app = build_app();
    create_category(&app, "Groceries").await;

    let user_facing = app.category_service.list_categories().expect("list");
    assert!(user_facing.iter().all(|c| !c.is_system));
    assert!(user_facing.iter().any(|c| c.name == "Groceries"));

    let all = app.category_service.list_all_categories().expect("list all");
    assert!(all.iter().any(|c| c.name == "Initial Balance"));
    assert!(all.iter().any(|c| c.name == "Balance Adjustment"));
}

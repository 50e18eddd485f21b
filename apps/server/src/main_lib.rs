use std::sync::{Arc, RwLock};

use chrono::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pennybook_core::categories::{CategoryService, CategoryServiceTrait};
use pennybook_core::fx::{FxService, FxServiceTrait};
use pennybook_core::ledger::{LedgerService, LedgerServiceTrait};
use pennybook_core::reports::{ReportsService, ReportsServiceTrait};
use pennybook_core::settings::{SettingsService, SettingsServiceTrait};
use pennybook_core::wallets::{WalletService, WalletServiceTrait};
use pennybook_storage_sqlite::categories::CategoryRepository;
use pennybook_storage_sqlite::db::{self, write_actor};
use pennybook_storage_sqlite::fx::FxRepository;
use pennybook_storage_sqlite::settings::SettingsRepository;
use pennybook_storage_sqlite::transactions::TransactionRepository;
use pennybook_storage_sqlite::wallets::WalletRepository;

use crate::config::Config;

pub struct AppState {
    pub wallet_service: Arc<dyn WalletServiceTrait>,
    pub category_service: Arc<dyn CategoryServiceTrait>,
    pub fx_service: Arc<dyn FxServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub reports_service: Arc<dyn ReportsServiceTrait>,
    pub settings_service: Arc<dyn SettingsServiceTrait>,
    pub base_currency: Arc<RwLock<String>>,
    pub db_path: String,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let wallet_repository = Arc::new(WalletRepository::new(pool.clone(), writer.clone()));
    let category_repository = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let fx_repository = Arc::new(FxRepository::new(pool.clone(), writer.clone()));
    let settings_repository = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));

    let fx_service = Arc::new(
        FxService::new(fx_repository).with_thresholds(config.resolver_thresholds),
    );

    // The base currency is shared mutable state: the settings service writes
    // it, the ledger and reports services read it per request.
    let base_currency = Arc::new(RwLock::new(String::new()));
    let settings_service = Arc::new(SettingsService::new(
        settings_repository,
        base_currency.clone(),
    ));
    *base_currency.write().unwrap() = settings_service.get_base_currency()?;

    let wallet_service = Arc::new(WalletService::new(wallet_repository));
    let category_service = Arc::new(CategoryService::new(category_repository));
    let ledger_service = Arc::new(
        LedgerService::new(
            transaction_repository.clone(),
            wallet_service.clone(),
            category_service.clone(),
            fx_service.clone(),
            base_currency.clone(),
        )
        .with_idempotency_ttl(Duration::hours(config.idempotency_ttl_hours)),
    );
    let reports_service = Arc::new(ReportsService::new(
        transaction_repository,
        wallet_service.clone(),
        fx_service.clone(),
        base_currency.clone(),
    ));

    Ok(Arc::new(AppState {
        wallet_service,
        category_service,
        fx_service,
        ledger_service,
        reports_service,
        settings_service,
        base_currency,
        db_path,
    }))
}

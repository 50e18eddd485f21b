use async_trait::async_trait;
use log::debug;
use std::sync::{Arc, RwLock};

use super::settings_traits::SettingsRepositoryTrait;
use crate::currencies::{normalize_currency_code, validate_currency_code};
use crate::errors::{DatabaseError, Error, Result};
use crate::settings::{Settings, SettingsUpdate};

const BASE_CURRENCY_KEY: &str = "base_currency";
const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Trait defining the contract for settings service operations.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()>;

    /// The user's base currency, falling back to the default when unset.
    fn get_base_currency(&self) -> Result<String>;

    async fn update_base_currency(&self, new_base_currency: &str) -> Result<()>;

    /// Get a single setting value by key. Returns None if not found.
    fn get_setting_value(&self, key: &str) -> Result<Option<String>>;

    /// Set a single setting value by key.
    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    base_currency: Arc<RwLock<String>>,
}

impl SettingsService {
    pub fn new(
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        SettingsService {
            settings_repository,
            base_currency,
        }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        Ok(Settings {
            base_currency: self.get_base_currency()?,
        })
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        if let Some(ref new_base_currency) = new_settings.base_currency {
            let current = self.get_base_currency()?;
            if current != *new_base_currency {
                self.update_base_currency(new_base_currency).await?;
            }
        }
        Ok(())
    }

    fn get_base_currency(&self) -> Result<String> {
        match self.settings_repository.get_setting(BASE_CURRENCY_KEY) {
            Ok(value) => Ok(value),
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                Ok(DEFAULT_BASE_CURRENCY.to_string())
            }
            Err(e) => Err(e),
        }
    }

    async fn update_base_currency(&self, new_base_currency: &str) -> Result<()> {
        validate_currency_code(new_base_currency)?;
        let normalized = normalize_currency_code(new_base_currency);
        debug!("Updating base currency to {}", normalized);

        self.settings_repository
            .update_setting(BASE_CURRENCY_KEY, &normalized)
            .await?;

        let mut shared = self
            .base_currency
            .write()
            .map_err(|_| Error::Unexpected("Base currency lock poisoned".to_string()))?;
        *shared = normalized;
        Ok(())
    }

    fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Database(DatabaseError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()> {
        self.settings_repository.update_setting(key, value).await
    }
}

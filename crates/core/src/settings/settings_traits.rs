use async_trait::async_trait;

use crate::errors::Result;

/// Trait defining the contract for the keyed settings store.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Reads a setting value; `DatabaseError::NotFound` when the key is absent.
    fn get_setting(&self, key: &str) -> Result<String>;

    async fn update_setting(&self, key: &str, value: &str) -> Result<()>;
}

use async_trait::async_trait;

use super::categories_model::{Category, NewCategory};
use crate::errors::Result;

/// Trait defining the contract for category repository operations.
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn get_by_id(&self, category_id: &str) -> Result<Category>;

    /// Lists categories; system categories only when `include_system` is set.
    fn list(&self, include_system: bool) -> Result<Vec<Category>>;

    async fn create(&self, new_category: NewCategory) -> Result<Category>;

    async fn delete(&self, category_id: &str) -> Result<()>;
}

/// Trait defining the contract for category service operations.
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn get_category(&self, category_id: &str) -> Result<Category>;

    /// User-facing listing; system categories are excluded.
    fn list_categories(&self) -> Result<Vec<Category>>;

    fn list_all_categories(&self) -> Result<Vec<Category>>;

    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;

    async fn delete_category(&self, category_id: &str) -> Result<()>;
}

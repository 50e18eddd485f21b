use std::sync::Arc;

use super::categories_model::{Category, NewCategory};
use super::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::{Error, Result, ValidationError};

/// Service for managing categories.
pub struct CategoryService {
    repository: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl CategoryServiceTrait for CategoryService {
    fn get_category(&self, category_id: &str) -> Result<Category> {
        self.repository.get_by_id(category_id)
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        self.repository.list(false)
    }

    fn list_all_categories(&self) -> Result<Vec<Category>> {
        self.repository.list(true)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        new_category.validate()?;
        self.repository.create(new_category).await
    }

    async fn delete_category(&self, category_id: &str) -> Result<()> {
        let category = self.repository.get_by_id(category_id)?;
        if category.is_system {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "System categories cannot be deleted".to_string(),
            )));
        }
        self.repository.delete(category_id).await
    }
}

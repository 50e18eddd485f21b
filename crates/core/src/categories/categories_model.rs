//! Category domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{CATEGORY_BALANCE_ADJUSTMENT, CATEGORY_INITIAL_BALANCE};
use crate::errors::{Error, Result, ValidationError};

/// A transaction category. System categories back opening balances and
/// balance adjustments; they never appear in user-facing pickers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub is_system: bool,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl NewCategory {
    /// Validates the new category data.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Category name cannot be empty".to_string(),
            )));
        }
        if name.eq_ignore_ascii_case(CATEGORY_INITIAL_BALANCE)
            || name.eq_ignore_ascii_case(CATEGORY_BALANCE_ADJUSTMENT)
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "'{name}' is a reserved category name"
            ))));
        }
        Ok(())
    }
}

use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use pennybook_core::categories::{Category, CategoryRepositoryTrait, NewCategory};
use pennybook_core::errors::{DatabaseError, Error, Result};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::categories;

use super::model::CategoryDB;

/// Repository for category lookups. The two system categories are seeded by
/// migration and only ever read here.
pub struct CategoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CategoryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn get_by_id(&self, category_id: &str) -> Result<Category> {
        let mut conn = get_connection(&self.pool)?;

        let row = categories::table
            .find(category_id)
            .first::<CategoryDB>(&mut conn)
            .into_core()?;
        Ok(row.into())
    }

    fn list(&self, include_system: bool) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = categories::table.into_boxed();
        if !include_system {
            query = query.filter(categories::is_system.eq(false));
        }

        let rows = query
            .order(categories::name.asc())
            .load::<CategoryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create(&self, new_category: NewCategory) -> Result<Category> {
        self.writer
            .exec(move |conn| {
                let row: CategoryDB = new_category.into();
                diesel::insert_into(categories::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(row.into())
            })
            .await
    }

    async fn delete(&self, category_id: &str) -> Result<()> {
        let category_id = category_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(categories::table.find(&category_id))
                    .execute(conn)
                    .into_core()?;
                if deleted == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Category {category_id} not found"
                    ))));
                }
                Ok(())
            })
            .await
    }
}

use super::like_pattern;
use crate::db::rows::CategoryRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::models::{Category, CategoryType};

/// Category reads also change when transactions come and go
const USAGE_TABLES: &[Table] = &[Table::Categories, Table::Transactions];

#[derive(Clone)]
pub struct CategoryRepository {
    db: Database,
}

fn to_models(rows: Vec<CategoryRow>) -> Vec<Category> {
    rows.into_iter().map(Category::from).collect()
}

impl CategoryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seed the built-in categories on an empty table; returns rows inserted
    pub async fn initialize_categories(&self) -> Result<usize> {
        self.db.call(|db| db.seed_categories()).await
    }

    /// Insert or replace, returning the id
    pub async fn create(&self, category: &Category) -> Result<i64> {
        let row = CategoryRow::from(category);
        self.db.call(move |db| db.upsert_category(&row)).await
    }

    pub async fn update(&self, category: &Category) -> Result<()> {
        let row = CategoryRow::from(category);
        self.db.call(move |db| db.update_category(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_category(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Category>> {
        self.db
            .call(move |db| Ok(db.get_category(id)?.map(Category::from)))
            .await
    }

    pub async fn first_by_type(&self, category_type: CategoryType) -> Result<Option<Category>> {
        self.db
            .call(move |db| {
                Ok(db
                    .first_category_by_type(category_type.as_str())?
                    .map(Category::from))
            })
            .await
    }

    pub async fn count(&self) -> Result<i64> {
        self.db.call(|db| db.count_categories()).await
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.db.call(|db| Ok(to_models(db.list_categories()?))).await
    }

    pub fn watch_all(&self) -> Snapshots<Vec<Category>> {
        self.db
            .watch(&[Table::Categories], |db| Ok(to_models(db.list_categories()?)))
    }

    pub fn watch_by_type(&self, category_type: CategoryType) -> Snapshots<Vec<Category>> {
        self.db.watch(&[Table::Categories], move |db| {
            Ok(to_models(db.list_categories_by_type(category_type.as_str())?))
        })
    }

    pub fn watch_by_types(&self, types: &[CategoryType]) -> Snapshots<Vec<Category>> {
        let types: Vec<&'static str> = types.iter().map(|t| t.as_str()).collect();
        self.db.watch(&[Table::Categories], move |db| {
            Ok(to_models(db.list_categories_by_types(&types)?))
        })
    }

    /// Categories of a type whose title contains `query`
    pub fn watch_search_by_type(
        &self,
        query: &str,
        category_type: CategoryType,
    ) -> Snapshots<Vec<Category>> {
        let pattern = like_pattern(query);
        self.db.watch(&[Table::Categories], move |db| {
            Ok(to_models(
                db.search_categories_by_type(category_type.as_str(), &pattern)?,
            ))
        })
    }

    /// Categories of a type that an account's transactions use
    pub fn watch_used_by_type(
        &self,
        account_id: i64,
        category_type: CategoryType,
    ) -> Snapshots<Vec<Category>> {
        self.db.watch(USAGE_TABLES, move |db| {
            Ok(to_models(
                db.list_used_categories_by_type(account_id, category_type.as_str())?,
            ))
        })
    }

    /// Transaction count per category for an account, most used first
    pub async fn usage(&self, account_id: i64) -> Result<Vec<(Category, i64)>> {
        self.db
            .call(move |db| {
                Ok(db
                    .category_usage(account_id)?
                    .into_iter()
                    .map(|(row, uses)| (Category::from(row), uses))
                    .collect())
            })
            .await
    }
}

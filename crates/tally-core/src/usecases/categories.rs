use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::{Error, Result};
use crate::models::{Category, CategoryType};

#[derive(Clone)]
pub struct CategoryUseCases {
    repos: Repositories,
}

impl CategoryUseCases {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Seed the built-in categories once; returns rows inserted
    pub async fn initialize_categories(&self) -> Result<usize> {
        self.repos.categories.initialize_categories().await
    }

    pub fn get_categories(&self) -> Snapshots<Vec<Category>> {
        self.repos.categories.watch_all()
    }

    pub fn get_categories_by_type(&self, category_type: CategoryType) -> Snapshots<Vec<Category>> {
        self.repos.categories.watch_by_type(category_type)
    }

    pub fn get_categories_by_types(&self, types: &[CategoryType]) -> Snapshots<Vec<Category>> {
        self.repos.categories.watch_by_types(types)
    }

    pub fn search_categories_by_type(
        &self,
        query: &str,
        category_type: CategoryType,
    ) -> Snapshots<Vec<Category>> {
        self.repos
            .categories
            .watch_search_by_type(query.trim(), category_type)
    }

    pub async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.repos.categories.get(id).await
    }

    pub fn get_used_categories_by_type(
        &self,
        account_id: i64,
        category_type: CategoryType,
    ) -> Snapshots<Vec<Category>> {
        self.repos
            .categories
            .watch_used_by_type(account_id, category_type)
    }

    /// Create a category, returning its id
    pub async fn create_category(&self, category: &Category) -> Result<i64> {
        let category = self.checked(category).await?;
        self.repos.categories.create(&category).await
    }

    /// Update a category; re-parenting that would form a cycle is rejected
    pub async fn update_category(&self, category: &Category) -> Result<()> {
        let category = self.checked(category).await?;
        self.repos.categories.update(&category).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.repos.categories.delete(id).await
    }

    async fn checked(&self, category: &Category) -> Result<Category> {
        let title = required(&category.title, "Category title")?;
        if let Some(parent_id) = category.parent_id {
            if self.repos.categories.get(parent_id).await?.is_none() {
                return Err(Error::Validation(format!(
                    "Parent category {} does not exist",
                    parent_id
                )));
            }
        }
        Ok(Category {
            title,
            ..category.clone()
        })
    }
}

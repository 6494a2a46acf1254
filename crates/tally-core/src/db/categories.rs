//! Category operations: tree maintenance, seeding and usage counts

use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::info;

use super::rows::{select_list, CategoryRow, CATEGORY_COLUMNS};
use super::{in_transaction, new_id, Database, DbConn, Table};
use crate::error::{Error, Result};
use crate::models::CategoryType;

/// One entry of the built-in category set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedCategory {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: &'static str,
    pub icon: &'static str,
    pub category_type: CategoryType,
}

const fn seed(
    id: i64,
    parent_id: Option<i64>,
    title: &'static str,
    icon: &'static str,
    category_type: CategoryType,
) -> SeedCategory {
    SeedCategory {
        id,
        parent_id,
        title,
        icon,
        category_type,
    }
}

/// Categories inserted on first run. Ids are fixed so parents resolve.
pub const SEED_CATEGORIES: &[SeedCategory] = &[
    seed(1, None, "Food & Drink", "food", CategoryType::Expense),
    seed(2, Some(1), "Groceries", "groceries", CategoryType::Expense),
    seed(3, Some(1), "Restaurants", "restaurant", CategoryType::Expense),
    seed(4, None, "Transport", "transport", CategoryType::Expense),
    seed(5, Some(4), "Bus", "bus", CategoryType::Expense),
    seed(6, Some(4), "Fuel", "fuel", CategoryType::Expense),
    seed(7, None, "Travel", "travel", CategoryType::Expense),
    seed(8, None, "Home", "home", CategoryType::Expense),
    seed(9, None, "Study", "study", CategoryType::Expense),
    seed(10, None, "Sport", "sport", CategoryType::Expense),
    seed(11, None, "Clothes", "clothes", CategoryType::Expense),
    seed(12, None, "Baby", "baby", CategoryType::Expense),
    seed(13, None, "Movies", "movies", CategoryType::Expense),
    seed(14, None, "Other expense", "other", CategoryType::Expense),
    seed(15, None, "Salary", "salary", CategoryType::Income),
    seed(16, None, "Bonus", "bonus", CategoryType::Income),
    seed(17, None, "Interest", "interest", CategoryType::Income),
    seed(18, None, "Saving interest", "saving", CategoryType::Income),
    seed(19, None, "Other income", "other_income", CategoryType::Income),
    seed(20, None, "Lend", "lend", CategoryType::Lend),
    seed(21, None, "Borrow", "borrow", CategoryType::Borrowing),
    seed(22, None, "Transfer", "transfer", CategoryType::Transfer),
    seed(23, None, "Balance adjustment", "adjustment", CategoryType::Adjustment),
];

impl From<&SeedCategory> for CategoryRow {
    fn from(seed: &SeedCategory) -> Self {
        Self {
            id: seed.id,
            parent_id: seed.parent_id,
            title: seed.title.to_string(),
            icon: seed.icon.to_string(),
            category_type: seed.category_type.as_str().to_string(),
        }
    }
}

/// Fail if making `parent_id` the parent of `id` would close a loop
fn check_parent(conn: &DbConn, id: i64, parent_id: Option<i64>) -> Result<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if id != 0 && parent_id == id {
        return Err(Error::Validation(
            "A category cannot be its own parent".to_string(),
        ));
    }
    if id == 0 {
        return Ok(());
    }

    // Walk up from the proposed parent; meeting `id` means a cycle
    let loops: bool = conn.query_row(
        r#"
        WITH RECURSIVE ancestors(id, parent_id) AS (
            SELECT id, parent_id FROM categories WHERE id = ?1
            UNION
            SELECT c.id, c.parent_id
            FROM categories c
            INNER JOIN ancestors a ON c.id = a.parent_id
        )
        SELECT EXISTS(SELECT 1 FROM ancestors WHERE id = ?2)
        "#,
        params![parent_id, id],
        |row| row.get(0),
    )?;

    if loops {
        return Err(Error::Validation(
            "Category parent would create a cycle".to_string(),
        ));
    }
    Ok(())
}

fn insert_category_row(conn: &DbConn, category: &CategoryRow) -> Result<i64> {
    let id: i64 = conn.query_row(
        r#"
        INSERT INTO categories (id, parent_id, title, icon, category_type)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            parent_id = excluded.parent_id,
            title = excluded.title,
            icon = excluded.icon,
            category_type = excluded.category_type
        RETURNING id
        "#,
        params![
            new_id(category.id),
            category.parent_id,
            category.title,
            category.icon,
            category.category_type
        ],
        |row| row.get(0),
    )?;
    Ok(id)
}

impl Database {
    /// Insert or replace a category by id, returning the id
    pub fn upsert_category(&self, category: &CategoryRow) -> Result<i64> {
        let conn = self.conn()?;
        check_parent(&conn, category.id, category.parent_id)?;
        let id = insert_category_row(&conn, category)?;
        self.notify(&[Table::Categories]);
        Ok(id)
    }

    /// Update a category by id
    pub fn update_category(&self, category: &CategoryRow) -> Result<()> {
        let conn = self.conn()?;
        check_parent(&conn, category.id, category.parent_id)?;
        conn.execute(
            "UPDATE categories SET parent_id = ?, title = ?, icon = ?, category_type = ? WHERE id = ?",
            params![
                category.parent_id,
                category.title,
                category.icon,
                category.category_type,
                category.id
            ],
        )?;
        self.notify(&[Table::Categories]);
        Ok(())
    }

    /// Delete a category; children and their transactions cascade
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        self.notify(Table::Categories.cascade());
        Ok(())
    }

    /// Insert the built-in categories if the table is empty
    ///
    /// Returns the number of rows inserted (0 when categories already exist).
    pub fn seed_categories(&self) -> Result<usize> {
        let conn = self.conn()?;

        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if existing > 0 {
            info!(existing, "Categories already present, skipping seed");
            return Ok(0);
        }

        let inserted = in_transaction(&conn, |conn| {
            for seed in SEED_CATEGORIES {
                insert_category_row(conn, &CategoryRow::from(seed))?;
            }
            Ok(SEED_CATEGORIES.len())
        })?;

        self.notify(&[Table::Categories]);
        info!(inserted, "Seeded default categories");
        Ok(inserted)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<CategoryRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM categories WHERE id = ?",
                select_list(None, CATEGORY_COLUMNS)
            ),
            params![id],
            |row| CategoryRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// List every category
    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY id",
            select_list(None, CATEGORY_COLUMNS)
        ))?;

        let categories = stmt
            .query_map([], |row| CategoryRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// List categories of one type
    pub fn list_categories_by_type(&self, category_type: &str) -> Result<Vec<CategoryRow>> {
        self.list_categories_by_types(&[category_type])
    }

    /// List categories whose type is any of `types`
    pub fn list_categories_by_types(&self, types: &[&str]) -> Result<Vec<CategoryRow>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let placeholders = vec!["?"; types.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE category_type IN ({}) ORDER BY id",
            select_list(None, CATEGORY_COLUMNS),
            placeholders
        ))?;

        let categories = stmt
            .query_map(params_from_iter(types.iter()), |row| {
                CategoryRow::read(row, 0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Lowest-id category of a type
    pub fn first_category_by_type(&self, category_type: &str) -> Result<Option<CategoryRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM categories WHERE category_type = ? ORDER BY id LIMIT 1",
                select_list(None, CATEGORY_COLUMNS)
            ),
            params![category_type],
            |row| CategoryRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Categories of a type whose title matches a LIKE pattern
    pub fn search_categories_by_type(
        &self,
        category_type: &str,
        pattern: &str,
    ) -> Result<Vec<CategoryRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE category_type = ? AND title LIKE ? ESCAPE '\\' ORDER BY id",
            select_list(None, CATEGORY_COLUMNS)
        ))?;

        let categories = stmt
            .query_map(params![category_type, pattern], |row| {
                CategoryRow::read(row, 0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    pub fn count_categories(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Categories of a type referenced by at least one of the account's transactions
    pub fn list_used_categories_by_type(
        &self,
        account_id: i64,
        category_type: &str,
    ) -> Result<Vec<CategoryRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM categories c
            WHERE c.category_type = ?
              AND EXISTS (
                SELECT 1 FROM transactions t
                WHERE t.category_id = c.id AND t.account_id = ?
              )
            ORDER BY c.id
            "#,
            select_list(Some("c"), CATEGORY_COLUMNS)
        ))?;

        let categories = stmt
            .query_map(params![category_type, account_id], |row| {
                CategoryRow::read(row, 0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Number of transactions per category in an account, most used first
    pub fn category_usage(&self, account_id: i64) -> Result<Vec<(CategoryRow, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}, COUNT(t.id) AS uses
            FROM categories c
            INNER JOIN transactions t ON t.category_id = c.id
            WHERE t.account_id = ?
            GROUP BY c.id
            ORDER BY uses DESC, c.id
            "#,
            select_list(Some("c"), CATEGORY_COLUMNS)
        ))?;

        let usage = stmt
            .query_map(params![account_id], |row| {
                Ok((CategoryRow::read(row, 0)?, row.get(CATEGORY_COLUMNS.len())?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(usage)
    }
}

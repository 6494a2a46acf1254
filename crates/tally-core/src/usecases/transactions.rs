use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::{ensure, Error, Result};
use crate::models::{Category, CategoryType, NewTransaction, Transaction, TransactionDetails};
use crate::storage::ImageStore;

fn check_amount(amount: f64) -> Result<()> {
    ensure(amount.is_finite(), "Amount must be a number")?;
    ensure(amount > 0.0, "Amount must be greater than zero")
}

#[derive(Clone)]
pub struct TransactionUseCases {
    repos: Repositories,
    images: ImageStore,
}

impl TransactionUseCases {
    pub fn new(repos: Repositories, images: ImageStore) -> Self {
        Self { repos, images }
    }

    /// Record a transaction and apply it to the account balance
    ///
    /// Income and borrowing add the amount, expense and lend subtract it,
    /// transfer and adjustment leave the balance alone. Returns the new id.
    pub async fn add_transaction(&self, transaction: NewTransaction) -> Result<i64> {
        check_amount(transaction.amount)?;
        let description = required(&transaction.description, "Description")?;

        let category = self.category(transaction.category_id).await?;

        let id = self
            .repos
            .transactions
            .insert(&Transaction {
                id: 0,
                amount: transaction.amount,
                created_at: transaction.created_at,
                description,
                category_id: transaction.category_id,
                account_id: transaction.account_id,
                event_id: transaction.event_id,
                location_id: transaction.location_id,
                lender_id: transaction.lender_id,
                borrower_id: transaction.borrower_id,
                payee_ids: transaction.payee_ids,
            })
            .await?;

        let delta = category.category_type.balance_change(transaction.amount);
        if delta != 0.0 {
            self.repos
                .accounts
                .adjust_balance(transaction.account_id, delta)
                .await?;
        }

        info!(transaction_id = id, amount = transaction.amount, category = %category.title, "Transaction added");
        Ok(id)
    }

    /// Replace a transaction, moving its balance effect accordingly
    pub async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        check_amount(transaction.amount)?;
        let description = required(&transaction.description, "Description")?;

        let previous = self
            .repos
            .transactions
            .get(transaction.id)
            .await?
            .ok_or_else(|| {
                Error::Validation(format!("Transaction {} does not exist", transaction.id))
            })?;
        let old_category = self.category(previous.category_id).await?;
        let new_category = self.category(transaction.category_id).await?;

        self.repos
            .transactions
            .update(&Transaction {
                description,
                ..transaction.clone()
            })
            .await?;

        let undo = -old_category.category_type.balance_change(previous.amount);
        let redo = new_category.category_type.balance_change(transaction.amount);
        if previous.account_id == transaction.account_id {
            if undo + redo != 0.0 {
                self.repos
                    .accounts
                    .adjust_balance(transaction.account_id, undo + redo)
                    .await?;
            }
        } else {
            self.repos
                .accounts
                .adjust_balance(previous.account_id, undo)
                .await?;
            self.repos
                .accounts
                .adjust_balance(transaction.account_id, redo)
                .await?;
        }
        Ok(())
    }

    /// Delete a transaction, undo its balance effect and remove its image files
    ///
    /// Returns false when there was nothing to delete.
    pub async fn delete_transaction(&self, id: i64) -> Result<bool> {
        let Some(transaction) = self.repos.transactions.get(id).await? else {
            return Ok(false);
        };
        let category = self.repos.categories.get(transaction.category_id).await?;
        let images = self.repos.images.list(id).await?;

        self.repos.transactions.delete(id).await?;

        if let Some(category) = category {
            let undo = -category.category_type.balance_change(transaction.amount);
            if undo != 0.0 {
                self.repos
                    .accounts
                    .adjust_balance(transaction.account_id, undo)
                    .await?;
            }
        }

        if !images.is_empty() {
            let store = self.images.clone();
            let removed = tokio::task::spawn_blocking(move || store.delete_images(&images)).await?;
            if let Err(e) = removed {
                warn!(transaction_id = id, "Failed to remove image files: {}", e);
            }
        }

        info!(transaction_id = id, "Transaction deleted");
        Ok(true)
    }

    pub async fn get_transaction(&self, id: i64) -> Result<Option<TransactionDetails>> {
        self.repos.transactions.details(id).await
    }

    /// An account's transactions, newest first, kept up to date
    pub fn get_transactions(&self, account_id: i64) -> Snapshots<Vec<TransactionDetails>> {
        self.repos.transactions.watch_details(account_id)
    }

    /// An account's transactions in `[from, to]`, kept up to date
    pub fn get_transactions_by_date_range(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Snapshots<Vec<TransactionDetails>>> {
        ensure(from <= to, "Start date must not be after end date")?;
        Ok(self
            .repos
            .transactions
            .watch_details_in_range(account_id, from, to))
    }

    pub fn get_transactions_by_event(&self, event_id: i64) -> Snapshots<Vec<TransactionDetails>> {
        self.repos.transactions.watch_details_by_event(event_id)
    }

    /// Transaction counts per category for an account, most used first
    pub async fn category_usage(&self, account_id: i64) -> Result<Vec<(Category, i64)>> {
        self.repos.categories.usage(account_id).await
    }

    /// The `limit` most used categories of one type, most used first
    pub async fn most_used_categories(
        &self,
        account_id: i64,
        category_type: CategoryType,
        limit: usize,
    ) -> Result<Vec<Category>> {
        Ok(self
            .category_usage(account_id)
            .await?
            .into_iter()
            .filter(|(category, _)| category.category_type == category_type)
            .take(limit)
            .map(|(category, _)| category)
            .collect())
    }

    async fn category(&self, id: i64) -> Result<Category> {
        self.repos
            .categories
            .get(id)
            .await?
            .ok_or_else(|| Error::Validation(format!("Category {} does not exist", id)))
    }
}

use std::sync::Arc;

use tracing::info;

use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::{ensure, Result};
use crate::models::{timestamp_now, Account, AccountType, NewAccount, User};
use crate::session::{Session, DEFAULT_USER_ID};

pub const ADMIN_USERNAME: &str = "Admin";
pub const ADMIN_BALANCE: f64 = 10000.0;

fn check_balance(balance: f64) -> Result<()> {
    ensure(balance.is_finite(), "Balance must be a number")?;
    ensure(balance >= 0.0, "Balance cannot be negative")
}

#[derive(Clone)]
pub struct AccountUseCases {
    repos: Repositories,
    session: Arc<Session>,
}

impl AccountUseCases {
    pub fn new(repos: Repositories, session: Arc<Session>) -> Self {
        Self { repos, session }
    }

    /// Create an account, returning its id
    pub async fn add_account(&self, account: NewAccount) -> Result<i64> {
        let username = required(&account.username, "Account name")?;
        check_balance(account.balance)?;

        let id = self
            .repos
            .accounts
            .insert(&Account {
                id: 0,
                user_id: account.user_id,
                username,
                account_type: account.account_type,
                balance: account.balance,
                created_at: timestamp_now(),
            })
            .await?;

        info!(account_id = id, "Account created");
        Ok(id)
    }

    pub async fn update_account(&self, account: &Account) -> Result<()> {
        let username = required(&account.username, "Account name")?;
        check_balance(account.balance)?;

        self.repos
            .accounts
            .update(&Account {
                username,
                ..account.clone()
            })
            .await
    }

    pub async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.repos.accounts.get(id).await
    }

    /// Accounts of the current user, kept up to date
    pub fn get_user_accounts(&self) -> Snapshots<Vec<Account>> {
        self.repos
            .accounts
            .watch_by_user(self.session.current_user_id())
    }

    /// Sum of the current user's balances, kept up to date
    pub fn total_balance(&self) -> Snapshots<f64> {
        self.repos
            .accounts
            .watch_total_balance(self.session.current_user_id())
    }

    /// Delete an account and everything it owns
    ///
    /// A deleted current account is replaced by the user's next account, or
    /// the session is cleared when none is left.
    pub async fn delete_account(&self, id: i64) -> Result<()> {
        self.repos.accounts.delete(id).await?;

        if self.session.current_account_id() == Some(id) {
            let user_id = self.session.current_user_id();
            let remaining = self.repos.accounts.list_by_user(user_id).await?;
            match remaining.first() {
                Some(next) => self.session.set_current_account_id(next.id)?,
                None => {
                    self.session.clear()?;
                    self.session.set_current_user_id(user_id)?;
                }
            }
        }
        Ok(())
    }

    /// Make sure the default user and its admin account exist
    ///
    /// Safe on every start: existing rows are left untouched. Returns the
    /// admin account id.
    pub async fn initialize_admin(&self) -> Result<i64> {
        let now = timestamp_now();
        self.repos
            .users
            .initialize_default_user(&User {
                id: DEFAULT_USER_ID,
                name: ADMIN_USERNAME.to_string(),
                email: None,
                auth_uid: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let account_id = self
            .repos
            .accounts
            .initialize_admin(&Account {
                id: 0,
                user_id: DEFAULT_USER_ID,
                username: ADMIN_USERNAME.to_string(),
                account_type: AccountType::Cash,
                balance: ADMIN_BALANCE,
                created_at: now,
            })
            .await?;

        self.session.set_current_user_id(DEFAULT_USER_ID)?;
        Ok(account_id)
    }
}

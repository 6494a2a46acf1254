use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::Repositories;
use crate::error::{Error, Result};
use crate::models::User;
use crate::session::Session;

#[derive(Clone)]
pub struct SessionUseCases {
    repos: Repositories,
    session: Arc<Session>,
}

impl SessionUseCases {
    pub fn new(repos: Repositories, session: Arc<Session>) -> Self {
        Self { repos, session }
    }

    /// Make sure an existing account is selected, if the user has any
    ///
    /// Keeps a valid selection; otherwise picks the user's first account.
    pub async fn initialize_session(&self) -> Result<Option<i64>> {
        if let Some(id) = self.session.current_account_id() {
            if self.repos.accounts.get(id).await?.is_some() {
                return Ok(Some(id));
            }
            debug!(account_id = id, "Selected account no longer exists");
        }

        let user_id = self.session.current_user_id();
        let accounts = self.repos.accounts.list_by_user(user_id).await?;
        match accounts.first() {
            Some(account) => {
                self.session.set_current_account_id(account.id)?;
                Ok(Some(account.id))
            }
            None => Ok(None),
        }
    }

    pub async fn select_account(&self, account_id: i64) -> Result<()> {
        if self.repos.accounts.get(account_id).await?.is_none() {
            return Err(Error::Validation(format!(
                "Account {} does not exist",
                account_id
            )));
        }
        self.session.set_current_account_id(account_id)
    }

    pub fn current_account_id(&self) -> Option<i64> {
        self.session.current_account_id()
    }

    /// Selected account id, or a validation error when none is selected
    pub fn require_account_id(&self) -> Result<i64> {
        self.session
            .current_account_id()
            .ok_or_else(|| Error::Validation("No account selected".to_string()))
    }

    pub fn observe_current_account_id(&self) -> watch::Receiver<Option<i64>> {
        self.session.observe_current_account_id()
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.repos.users.get(self.session.current_user_id()).await
    }

    pub fn clear(&self) -> Result<()> {
        self.session.clear()
    }
}

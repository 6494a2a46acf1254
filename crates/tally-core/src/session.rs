//! Durable "current user / current account" state
//!
//! One [`Session`] is opened at process start and handed around by `Arc`.
//! Writes persist through a [`SessionStore`] before observers are told.

use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::Result;

/// User id of the seeded default user
pub const DEFAULT_USER_ID: i64 = 1;

/// Persisted session fields; `None` means unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_account_id: Option<i64>,
}

/// Durable key-value backing for the session
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState>;
    fn save(&self, state: &SessionState) -> Result<()>;
}

/// Session persisted as a small JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionState::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Non-durable store for tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState> {
        Ok(*self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = *state;
        Ok(())
    }
}

/// The process-wide session
pub struct Session {
    store: Box<dyn SessionStore>,
    state: RwLock<SessionState>,
    account_tx: watch::Sender<Option<i64>>,
}

impl Session {
    /// Load the persisted state
    pub fn open(store: impl SessionStore + 'static) -> Result<Self> {
        let state = store.load()?;
        debug!(?state, "Session loaded");
        let (account_tx, _) = watch::channel(state.current_account_id);

        Ok(Self {
            store: Box::new(store),
            state: RwLock::new(state),
            account_tx,
        })
    }

    /// Current user, falling back to the seeded default user
    pub fn current_user_id(&self) -> i64 {
        self.snapshot().current_user_id.unwrap_or(DEFAULT_USER_ID)
    }

    pub fn set_current_user_id(&self, user_id: i64) -> Result<()> {
        self.update(|state| state.current_user_id = Some(user_id))?;
        info!(user_id, "Current user changed");
        Ok(())
    }

    pub fn current_account_id(&self) -> Option<i64> {
        self.snapshot().current_account_id
    }

    pub fn set_current_account_id(&self, account_id: i64) -> Result<()> {
        self.update(|state| state.current_account_id = Some(account_id))?;
        self.account_tx.send_replace(Some(account_id));
        info!(account_id, "Current account changed");
        Ok(())
    }

    pub fn has_selected_account(&self) -> bool {
        self.current_account_id().is_some()
    }

    /// Watch the current account; the latest value is readable immediately
    pub fn observe_current_account_id(&self) -> watch::Receiver<Option<i64>> {
        self.account_tx.subscribe()
    }

    /// Unset both ids and tell observers there is no account
    pub fn clear(&self) -> Result<()> {
        self.update(|state| *state = SessionState::default())?;
        self.account_tx.send_replace(None);
        info!("Session cleared");
        Ok(())
    }

    fn snapshot(&self) -> SessionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f`, persist, and only then keep the change
    fn update(&self, f: impl FnOnce(&mut SessionState)) -> Result<()> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = *guard;
        f(&mut next);
        self.store.save(&next)?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = Session::open(MemorySessionStore::new()).unwrap();
        assert_eq!(session.current_user_id(), DEFAULT_USER_ID);
        assert_eq!(session.current_account_id(), None);
        assert!(!session.has_selected_account());
    }

    #[test]
    fn test_observer_sees_latest_value_immediately() {
        let session = Session::open(MemorySessionStore::new()).unwrap();
        session.set_current_account_id(42).unwrap();

        let rx = session.observe_current_account_id();
        assert_eq!(*rx.borrow(), Some(42));

        session.clear().unwrap();
        assert_eq!(*rx.borrow(), None);
        assert_eq!(*session.observe_current_account_id().borrow(), None);
        assert_eq!(session.current_user_id(), DEFAULT_USER_ID);
    }

    #[tokio::test]
    async fn test_observer_is_woken_on_change() {
        let session = Session::open(MemorySessionStore::new()).unwrap();
        let mut rx = session.observe_current_account_id();
        rx.borrow_and_update();

        session.set_current_account_id(7).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(7));

        session.clear().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("session.json");

        let session = Session::open(FileSessionStore::new(&path)).unwrap();
        session.set_current_user_id(3).unwrap();
        session.set_current_account_id(9).unwrap();
        drop(session);

        let reopened = Session::open(FileSessionStore::new(&path)).unwrap();
        assert_eq!(reopened.current_user_id(), 3);
        assert_eq!(reopened.current_account_id(), Some(9));

        reopened.clear().unwrap();
        let state = FileSessionStore::new(&path).load().unwrap();
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_file_store_missing_or_empty_file_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert_eq!(FileSessionStore::new(&path).load().unwrap(), SessionState::default());

        fs::write(&path, "").unwrap();
        assert_eq!(FileSessionStore::new(&path).load().unwrap(), SessionState::default());
    }
}

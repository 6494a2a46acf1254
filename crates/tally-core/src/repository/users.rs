use tracing::info;

use crate::db::rows::UserRow;
use crate::db::Database;
use crate::error::Result;
use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        self.db
            .call(move |db| Ok(db.get_user(id)?.map(User::from)))
            .await
    }

    pub async fn get_by_auth_uid(&self, auth_uid: &str) -> Result<Option<User>> {
        let auth_uid = auth_uid.to_string();
        self.db
            .call(move |db| Ok(db.get_user_by_auth_uid(&auth_uid)?.map(User::from)))
            .await
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.db
            .call(|db| Ok(db.list_users()?.into_iter().map(User::from).collect()))
            .await
    }

    /// Insert or replace, returning the id
    pub async fn save(&self, user: &User) -> Result<i64> {
        let row = UserRow::from(user);
        self.db.call(move |db| db.upsert_user(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_user(id)).await
    }

    /// Insert `user` unless a user with its id exists; returns whether it was inserted
    pub async fn initialize_default_user(&self, user: &User) -> Result<bool> {
        let row = UserRow::from(user);
        self.db
            .call(move |db| {
                if db.get_user(row.id)?.is_some() {
                    return Ok(false);
                }
                db.upsert_user(&row)?;
                info!(user_id = row.id, "Created default user");
                Ok(true)
            })
            .await
    }
}

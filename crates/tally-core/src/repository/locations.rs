use super::like_pattern;
use crate::db::rows::LocationRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::models::Location;

fn locations(rows: Vec<LocationRow>) -> Vec<Location> {
    rows.into_iter().map(Location::from).collect()
}

#[derive(Clone)]
pub struct LocationRepository {
    db: Database,
}

impl LocationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, location: &Location) -> Result<i64> {
        let row = LocationRow::from(location);
        self.db.call(move |db| db.upsert_location(&row)).await
    }

    pub async fn update(&self, location: &Location) -> Result<()> {
        let row = LocationRow::from(location);
        self.db.call(move |db| db.update_location(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_location(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Location>> {
        self.db
            .call(move |db| Ok(db.get_location(id)?.map(Location::from)))
            .await
    }

    /// Exact, case-sensitive name match
    pub async fn get_by_name(&self, account_id: i64, name: &str) -> Result<Option<Location>> {
        let name = name.to_string();
        self.db
            .call(move |db| Ok(db.get_location_by_name(account_id, &name)?.map(Location::from)))
            .await
    }

    pub async fn list(&self, account_id: i64) -> Result<Vec<Location>> {
        self.db
            .call(move |db| Ok(locations(db.list_locations(account_id)?)))
            .await
    }

    pub fn watch_all(&self, account_id: i64) -> Snapshots<Vec<Location>> {
        self.db.watch(&[Table::Locations], move |db| {
            Ok(locations(db.list_locations(account_id)?))
        })
    }

    /// Locations whose name contains `query`, by name
    pub fn watch_search(&self, account_id: i64, query: &str) -> Snapshots<Vec<Location>> {
        let pattern = like_pattern(query);
        self.db.watch(&[Table::Locations], move |db| {
            Ok(locations(db.search_locations(account_id, &pattern)?))
        })
    }
}

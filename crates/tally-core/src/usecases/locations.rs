use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::{ensure, Result};
use crate::models::Location;

fn check_coordinates(coordinates: Option<(f64, f64)>) -> Result<()> {
    if let Some((latitude, longitude)) = coordinates {
        ensure(
            (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude),
            "Coordinates are out of range",
        )?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct LocationUseCases {
    repos: Repositories,
}

impl LocationUseCases {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Add a location, or return the existing one with exactly that name
    pub async fn add_location(
        &self,
        account_id: i64,
        name: &str,
        coordinates: Option<(f64, f64)>,
    ) -> Result<Location> {
        let name = required(name, "Location name")?;
        check_coordinates(coordinates)?;

        if let Some(existing) = self.repos.locations.get_by_name(account_id, &name).await? {
            return Ok(existing);
        }

        let mut location = Location {
            id: 0,
            name,
            account_id,
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
        };
        location.id = self.repos.locations.insert(&location).await?;
        Ok(location)
    }

    /// Rename or move a location
    pub async fn update_location(&self, location: &Location) -> Result<()> {
        let name = required(&location.name, "Location name")?;
        ensure(
            location.latitude.is_some() == location.longitude.is_some(),
            "Latitude and longitude must be given together",
        )?;
        check_coordinates(location.latitude.zip(location.longitude))?;

        self.repos
            .locations
            .update(&Location {
                name,
                ..location.clone()
            })
            .await
    }

    pub async fn delete_location(&self, id: i64) -> Result<()> {
        self.repos.locations.delete(id).await
    }

    pub async fn get_location(&self, id: i64) -> Result<Option<Location>> {
        self.repos.locations.get(id).await
    }

    pub fn get_locations(&self, account_id: i64) -> Snapshots<Vec<Location>> {
        self.repos.locations.watch_all(account_id)
    }

    pub fn search_locations(&self, account_id: i64, query: &str) -> Snapshots<Vec<Location>> {
        self.repos.locations.watch_search(account_id, query.trim())
    }
}

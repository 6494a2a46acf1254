//! Location command implementations

use anyhow::Result;
use tally_core::Tally;

use super::{current_account, print_json};

pub async fn cmd_locations_list(app: &Tally, json: bool) -> Result<()> {
    let account_id = current_account(app)?;
    let locations = app
        .locations
        .get_locations(account_id)
        .next()
        .await
        .unwrap_or_else(|| Ok(Vec::new()))?;

    if json {
        return print_json(&locations);
    }
    if locations.is_empty() {
        println!("No locations yet.");
        return Ok(());
    }
    for location in &locations {
        match (location.latitude, location.longitude) {
            (Some(lat), Some(lon)) => {
                println!("   [{}] {} ({:.5}, {:.5})", location.id, location.name, lat, lon)
            }
            _ => println!("   [{}] {}", location.id, location.name),
        }
    }
    Ok(())
}

pub async fn cmd_locations_add(
    app: &Tally,
    name: &str,
    coordinates: Option<(f64, f64)>,
) -> Result<()> {
    let account_id = current_account(app)?;
    let location = app
        .locations
        .add_location(account_id, name, coordinates)
        .await?;
    println!("📍 Location '{}' (id {})", location.name, location.id);
    Ok(())
}

//! Category command implementations

use anyhow::{anyhow, bail, Result};
use tally_core::models::{Category, CategoryType};
use tally_core::Tally;

use super::print_json;

pub async fn cmd_categories(
    app: &Tally,
    kind: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<CategoryType>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let mut stream = match (kind, search) {
        (Some(kind), Some(query)) => app.categories.search_categories_by_type(query, kind),
        (Some(kind), None) => app.categories.get_categories_by_type(kind),
        (None, Some(_)) => bail!("--search needs --type"),
        (None, None) => app.categories.get_categories(),
    };
    let categories = stream.next().await.unwrap_or_else(|| Ok(Vec::new()))?;

    if json {
        return print_json(&categories);
    }

    if categories.is_empty() {
        println!("No categories found. Run `tally init` to seed the defaults.");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────");
    for category in &categories {
        println!("   {}", format_category(category, &categories));
    }
    Ok(())
}

/// `[id] Title (type)`, indented under a listed parent
pub fn format_category(category: &Category, all: &[Category]) -> String {
    let nested = category
        .parent_id
        .is_some_and(|parent| all.iter().any(|c| c.id == parent));
    format!(
        "{}[{}] {} ({})",
        if nested { "    └ " } else { "" },
        category.id,
        category.title,
        category.category_type
    )
}

//! Init and session commands

use anyhow::{Context, Result};
use serde_json::json;
use tally_core::Tally;

use super::print_json;

pub async fn cmd_init(app: &Tally) -> Result<()> {
    println!("🔧 Initializing tally at {}...", app.db.path());

    let admin = app
        .accounts
        .initialize_admin()
        .await
        .context("Failed to create admin account")?;
    println!("   Admin account ready (id {})", admin);

    let seeded = app
        .categories
        .initialize_categories()
        .await
        .context("Failed to seed categories")?;
    if seeded > 0 {
        println!("   Seeded {} default categories", seeded);
    }

    let selected = app.sessions.initialize_session().await?;
    if let Some(id) = selected {
        println!("   Current account: {}", id);
    }

    println!("✅ Ready!");
    println!();
    println!("Next steps:");
    println!("  1. Record spending: tally transactions add 12.50 \"Lunch\" --category 3");
    println!("  2. See the month:   tally report");

    Ok(())
}

pub async fn cmd_session_show(app: &Tally, json: bool) -> Result<()> {
    let user = app.sessions.current_user().await?;
    let account_id = app.sessions.current_account_id();
    let account = match account_id {
        Some(id) => app.accounts.get_account_by_id(id).await?,
        None => None,
    };

    if json {
        return print_json(&json!({
            "user": user,
            "account": account,
        }));
    }

    match user {
        Some(user) => println!("User:    {} (id {})", user.name, user.id),
        None => println!("User:    (none)"),
    }
    match account {
        Some(account) => println!(
            "Account: {} (id {}, balance {:.2})",
            account.username, account.id, account.balance
        ),
        None => println!("Account: (none selected)"),
    }
    Ok(())
}

pub fn cmd_session_clear(app: &Tally) -> Result<()> {
    app.sessions.clear()?;
    println!("Session cleared.");
    Ok(())
}

//! Account command implementations

use anyhow::{anyhow, Result};
use tally_core::models::{AccountType, NewAccount};
use tally_core::Tally;

use super::{print_json, truncate};

pub async fn cmd_accounts_list(app: &Tally, json: bool) -> Result<()> {
    let accounts = app
        .accounts
        .get_user_accounts()
        .next()
        .await
        .unwrap_or_else(|| Ok(Vec::new()))?;

    if json {
        return print_json(&accounts);
    }

    if accounts.is_empty() {
        println!("No accounts yet. Create one with:");
        println!("  tally accounts add Wallet --balance 100");
        return Ok(());
    }

    let current = app.sessions.current_account_id();
    println!();
    println!("🏦 Accounts");
    println!("   ─────────────────────────────────────────────");
    for account in &accounts {
        let marker = if Some(account.id) == current { "*" } else { " " };
        println!(
            " {} [{}] {:<24} {:<9} {:>12.2}",
            marker,
            account.id,
            truncate(&account.username, 24),
            account.account_type,
            account.balance
        );
    }

    let total = app
        .accounts
        .total_balance()
        .next()
        .await
        .unwrap_or(Ok(0.0))?;
    println!("   ─────────────────────────────────────────────");
    println!("   Total: {:.2}", total);
    Ok(())
}

pub async fn cmd_accounts_add(app: &Tally, name: &str, kind: &str, balance: f64) -> Result<()> {
    let account_type: AccountType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let id = app
        .accounts
        .add_account(NewAccount {
            user_id: app.session.current_user_id(),
            username: name.to_string(),
            account_type,
            balance,
        })
        .await?;

    if app.sessions.current_account_id().is_none() {
        app.sessions.select_account(id).await?;
    }

    println!("✅ Created account '{}' (id {})", name.trim(), id);
    Ok(())
}

pub async fn cmd_accounts_delete(app: &Tally, id: i64) -> Result<()> {
    if app.accounts.get_account_by_id(id).await?.is_none() {
        println!("No account with id {}.", id);
        return Ok(());
    }

    app.accounts.delete_account(id).await?;
    println!("🗑️  Deleted account {}", id);
    match app.sessions.current_account_id() {
        Some(current) => println!("   Current account is now {}", current),
        None => println!("   No accounts left; session cleared"),
    }
    Ok(())
}

pub async fn cmd_accounts_select(app: &Tally, id: i64) -> Result<()> {
    app.sessions.select_account(id).await?;
    println!("Current account set to {}", id);
    Ok(())
}

//! Transaction command implementations

use anyhow::Result;
use chrono::{DateTime, Utc};
use tally_core::models::{timestamp_now, CategoryType, NewTransaction, TransactionDetails};
use tally_core::Tally;

use super::{current_account, parse_end, parse_start, print_json, truncate};

/// Everything `tally transactions add` accepts
pub struct TransactionArgs {
    pub amount: f64,
    pub description: String,
    pub category_id: i64,
    pub date: Option<String>,
    pub payee_ids: Vec<i64>,
    pub location_id: Option<i64>,
    pub event_id: Option<i64>,
    pub lender_id: Option<i64>,
    pub borrower_id: Option<i64>,
}

pub async fn cmd_transactions_list(
    app: &Tally,
    from: Option<&str>,
    to: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let account_id = current_account(app)?;

    let mut stream = if from.is_some() || to.is_some() {
        let from = match from {
            Some(date) => parse_start(date)?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let to = match to {
            Some(date) => parse_end(date)?,
            None => timestamp_now(),
        };
        app.transactions
            .get_transactions_by_date_range(account_id, from, to)?
    } else {
        app.transactions.get_transactions(account_id)
    };

    let mut transactions = stream.next().await.unwrap_or_else(|| Ok(Vec::new()))?;
    transactions.truncate(limit);

    if json {
        return print_json(&transactions);
    }

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  tally transactions add 12.50 \"Lunch\" --category 3");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");
    for details in &transactions {
        println!("   {}", format_transaction(details));
    }
    Ok(())
}

/// One list line: id, date, signed amount, category, description
pub fn format_transaction(details: &TransactionDetails) -> String {
    let tx = &details.transaction;
    let amount = match details.category.category_type {
        CategoryType::Income | CategoryType::Borrowing => {
            format!("\x1b[32m+{:.2}\x1b[0m", tx.amount) // Green for money in
        }
        CategoryType::Expense | CategoryType::Lend => {
            format!("\x1b[31m-{:.2}\x1b[0m", tx.amount) // Red for money out
        }
        CategoryType::Transfer | CategoryType::Adjustment => format!("{:.2}", tx.amount),
    };

    format!(
        "[{}] {} │ {:>10} │ {:<16} │ {}",
        tx.id,
        tx.created_at.format("%Y-%m-%d"),
        amount,
        truncate(&details.category.title, 16),
        truncate(&tx.description, 36)
    )
}

pub async fn cmd_transactions_add(app: &Tally, args: TransactionArgs) -> Result<()> {
    let account_id = current_account(app)?;
    let created_at = match args.date.as_deref() {
        Some(date) => parse_start(date)?,
        None => timestamp_now(),
    };

    let id = app
        .transactions
        .add_transaction(NewTransaction {
            amount: args.amount,
            created_at,
            description: args.description,
            category_id: args.category_id,
            account_id,
            event_id: args.event_id,
            location_id: args.location_id,
            lender_id: args.lender_id,
            borrower_id: args.borrower_id,
            payee_ids: args.payee_ids,
        })
        .await?;

    let balance = app
        .accounts
        .get_account_by_id(account_id)
        .await?
        .map(|a| a.balance)
        .unwrap_or_default();
    println!("✅ Recorded transaction {} (balance now {:.2})", id, balance);
    Ok(())
}

pub async fn cmd_transactions_delete(app: &Tally, id: i64) -> Result<()> {
    if app.transactions.delete_transaction(id).await? {
        println!("🗑️  Deleted transaction {}", id);
    } else {
        println!("No transaction with id {}.", id);
    }
    Ok(())
}

//! Payee command implementations

use anyhow::{anyhow, Result};
use tally_core::models::{NewPayee, Payee, PayeeType};
use tally_core::Tally;

use super::{current_account, print_json};

fn payee_type(kind: &str) -> Result<PayeeType> {
    kind.parse().map_err(|e: String| anyhow!(e))
}

pub async fn cmd_payees_list(app: &Tally, kind: &str, json: bool) -> Result<()> {
    let account_id = current_account(app)?;
    let payees = app
        .counterparties
        .get_payees_by_type(account_id, payee_type(kind)?)
        .next()
        .await
        .unwrap_or_else(|| Ok(Vec::new()))?;
    print_payees(&payees, json)
}

pub async fn cmd_payees_add(
    app: &Tally,
    name: &str,
    kind: &str,
    phone: Option<String>,
) -> Result<()> {
    let account_id = current_account(app)?;
    let payee = app
        .counterparties
        .add_payee(
            account_id,
            NewPayee {
                name: name.to_string(),
                payee_type: payee_type(kind)?,
                phone_number: phone,
                ..Default::default()
            },
        )
        .await?;

    println!("✅ Payee '{}' (id {})", payee.name, payee.id);
    Ok(())
}

pub async fn cmd_payees_search(app: &Tally, query: &str, kind: &str, json: bool) -> Result<()> {
    let account_id = current_account(app)?;
    let payees = app
        .counterparties
        .search_payees_by_type(account_id, query, payee_type(kind)?)
        .next()
        .await
        .unwrap_or_else(|| Ok(Vec::new()))?;
    print_payees(&payees, json)
}

fn print_payees(payees: &[Payee], json: bool) -> Result<()> {
    if json {
        return print_json(&payees);
    }
    if payees.is_empty() {
        println!("No payees found.");
        return Ok(());
    }
    for payee in payees {
        match &payee.phone_number {
            Some(phone) => println!("   [{}] {} ({})", payee.id, payee.name, phone),
            None => println!("   [{}] {}", payee.id, payee.name),
        }
    }
    Ok(())
}

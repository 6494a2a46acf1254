//! Report command implementations

use anyhow::Result;
use chrono::{Datelike, NaiveTime, Utc};
use serde_json::json;
use tally_core::usecases::HomeReport;
use tally_core::Tally;

use super::{current_account, parse_end, parse_start, print_json};

/// Width of the widest percentage bar
const BAR_WIDTH: f64 = 30.0;

pub async fn cmd_report(
    app: &Tally,
    from: Option<&str>,
    to: Option<&str>,
    monthly: bool,
    json: bool,
) -> Result<()> {
    let account_id = current_account(app)?;
    let now = Utc::now();
    let from = match from {
        Some(date) => parse_start(date)?,
        None => now
            .date_naive()
            .with_day(1)
            .unwrap_or(now.date_naive())
            .and_time(NaiveTime::MIN)
            .and_utc(),
    };
    let to = match to {
        Some(date) => parse_end(date)?,
        None => now,
    };

    let report = app.reports.home_report(account_id, from, to).await?;
    let months = if monthly {
        Some(app.reports.monthly_expenses(account_id, from, to).await?)
    } else {
        None
    };

    if json {
        return print_json(&json!({
            "from": from,
            "to": to,
            "report": report,
            "monthly": months,
        }));
    }

    println!();
    println!(
        "📊 {} → {}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    );
    print_report(&report);

    if let Some(months) = months {
        println!();
        println!("   Monthly expenses");
        for month in months {
            println!("   {}-{:02}  {:>12.2}", month.year, month.month, month.amount);
        }
    }
    Ok(())
}

fn print_report(report: &HomeReport) {
    if !report.has_data {
        println!("   No income or expenses in this range.");
        return;
    }

    println!("   Income:     {:>12.2}", report.income);
    println!("   Expense:    {:>12.2}", report.expense);
    println!("   Difference: {:>12.2}", report.difference);
    println!();
    println!("   Top expense categories");
    for entry in report.top_categories.iter().filter(|e| e.category.is_some()) {
        let title = entry
            .category
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or_default();
        let bar = "█".repeat((entry.percentage / 100.0 * BAR_WIDTH).round() as usize);
        println!(
            "   {:<18} {:>10.2} {:>5.1}% {}",
            title, entry.amount, entry.percentage, bar
        );
    }
}

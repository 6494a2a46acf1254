//! Tally CLI - Personal expense ledger
//!
//! Usage:
//!   tally init                          Create the store and default data
//!   tally accounts add Wallet -b 50     Add an account
//!   tally transactions add 12.5 Lunch -c 3
//!   tally report --from 2026-03-01      Income, expense and top categories

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let app = commands::open_app(cli.data_dir.as_deref(), cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Init => commands::cmd_init(&app).await,
        Commands::Accounts { action } => match action {
            None | Some(AccountsAction::List) => commands::cmd_accounts_list(&app, json).await,
            Some(AccountsAction::Add {
                name,
                r#type,
                balance,
            }) => commands::cmd_accounts_add(&app, &name, &r#type, balance).await,
            Some(AccountsAction::Delete { id }) => commands::cmd_accounts_delete(&app, id).await,
            Some(AccountsAction::Select { id }) => commands::cmd_accounts_select(&app, id).await,
        },
        Commands::Categories { r#type, search } => {
            commands::cmd_categories(&app, r#type.as_deref(), search.as_deref(), json).await
        }
        Commands::Transactions { action } => match action {
            None => commands::cmd_transactions_list(&app, None, None, 20, json).await,
            Some(TransactionsAction::List { from, to, limit }) => {
                commands::cmd_transactions_list(
                    &app,
                    from.as_deref(),
                    to.as_deref(),
                    limit,
                    json,
                )
                .await
            }
            Some(TransactionsAction::Add {
                amount,
                description,
                category,
                date,
                payees,
                location,
                event,
                lender,
                borrower,
            }) => {
                commands::cmd_transactions_add(
                    &app,
                    commands::TransactionArgs {
                        amount,
                        description,
                        category_id: category,
                        date,
                        payee_ids: payees,
                        location_id: location,
                        event_id: event,
                        lender_id: lender,
                        borrower_id: borrower,
                    },
                )
                .await
            }
            Some(TransactionsAction::Delete { id }) => {
                commands::cmd_transactions_delete(&app, id).await
            }
        },
        Commands::Payees { action } => match action {
            None => commands::cmd_payees_list(&app, "payee", json).await,
            Some(PayeesAction::List { r#type }) => {
                commands::cmd_payees_list(&app, &r#type, json).await
            }
            Some(PayeesAction::Add {
                name,
                r#type,
                phone,
            }) => commands::cmd_payees_add(&app, &name, &r#type, phone).await,
            Some(PayeesAction::Search { query, r#type }) => {
                commands::cmd_payees_search(&app, &query, &r#type, json).await
            }
        },
        Commands::Locations { action } => match action {
            None | Some(LocationsAction::List) => commands::cmd_locations_list(&app, json).await,
            Some(LocationsAction::Add { name, lat, lon }) => {
                let coordinates = lat.zip(lon);
                commands::cmd_locations_add(&app, &name, coordinates).await
            }
        },
        Commands::Events { action } => match action {
            None | Some(EventsAction::List) => commands::cmd_events_list(&app, json).await,
            Some(EventsAction::Add {
                name,
                start,
                end,
                participants,
            }) => {
                commands::cmd_events_add(&app, &name, start.as_deref(), end.as_deref(), participants)
                    .await
            }
        },
        Commands::Images { action } => match action {
            ImagesAction::Attach { transaction, files } => {
                commands::cmd_images_attach(&app, transaction, &files).await
            }
            ImagesAction::List { transaction } => {
                commands::cmd_images_list(&app, transaction, json).await
            }
        },
        Commands::Report { from, to, monthly } => {
            commands::cmd_report(&app, from.as_deref(), to.as_deref(), monthly, json).await
        }
        Commands::Session { action } => match action {
            None | Some(SessionAction::Show) => commands::cmd_session_show(&app, json).await,
            Some(SessionAction::Clear) => commands::cmd_session_clear(&app),
        },
    }
}

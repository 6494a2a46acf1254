//! Integration tests for tally-core
//!
//! These exercise the use cases end to end: bootstrap, account selection,
//! transactions moving balances, live snapshots, and image attachments.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tally_core::{
    config::IMAGES_SUBDIR,
    models::{
        timestamp_now, AccountType, CategoryType, NewAccount, NewEvent, NewPayee,
        Location, NewTransaction, PayeeType, PhoneContact, TransactionImage,
    },
    Database, ImageStore, MemorySessionStore, Session, StaticContacts, Tally,
};
use tempfile::TempDir;

fn app() -> (Tally, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::in_memory().expect("Failed to create database");
    let session = Session::open(MemorySessionStore::new()).expect("Failed to open session");
    let images = ImageStore::new(dir.path(), IMAGES_SUBDIR, dir.path().join("cache"));
    let contacts = StaticContacts::new(vec![
        PhoneContact {
            id: 2,
            display_name: "bob".to_string(),
        },
        PhoneContact {
            id: 1,
            display_name: "Alice".to_string(),
        },
    ]);
    (
        Tally::assemble(db, session, images, Arc::new(contacts)),
        dir,
    )
}

fn expense(account_id: i64, amount: f64) -> NewTransaction {
    NewTransaction {
        amount,
        created_at: timestamp_now(),
        description: "Groceries".to_string(),
        category_id: 2,
        account_id,
        event_id: None,
        location_id: None,
        lender_id: None,
        borrower_id: None,
        payee_ids: vec![],
    }
}

async fn balance(app: &Tally, account_id: i64) -> f64 {
    app.accounts
        .get_account_by_id(account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let (app, _dir) = app();

    let selected = app.bootstrap().await.unwrap();
    let admin = selected.expect("Admin account should be selected");
    assert_eq!(balance(&app, admin).await, 10000.0);

    assert_eq!(app.bootstrap().await.unwrap(), Some(admin));
    assert_eq!(app.accounts.initialize_admin().await.unwrap(), admin);
    assert_eq!(app.categories.initialize_categories().await.unwrap(), 0);

    let user = app.sessions.current_user().await.unwrap().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Admin");
}

#[tokio::test]
async fn test_session_observers_see_selection() {
    let (app, _dir) = app();
    app.bootstrap().await.unwrap();

    let second = app
        .accounts
        .add_account(NewAccount {
            user_id: 1,
            username: "Bank".to_string(),
            account_type: AccountType::Bank,
            balance: 0.0,
        })
        .await
        .unwrap();

    let rx = app.sessions.observe_current_account_id();
    app.sessions.select_account(second).await.unwrap();
    assert_eq!(*rx.borrow(), Some(second));

    let err = app.sessions.select_account(9999).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(app.sessions.current_account_id(), Some(second));

    app.sessions.clear().unwrap();
    assert_eq!(*rx.borrow(), None);
    assert!(app.sessions.require_account_id().is_err());
}

#[tokio::test]
async fn test_deleting_current_account_moves_selection() {
    let (app, _dir) = app();
    let admin = app.bootstrap().await.unwrap().unwrap();
    let spare = app
        .accounts
        .add_account(NewAccount {
            user_id: 1,
            username: "Spare".to_string(),
            account_type: AccountType::Cash,
            balance: 5.0,
        })
        .await
        .unwrap();

    app.accounts.delete_account(admin).await.unwrap();
    assert_eq!(app.sessions.current_account_id(), Some(spare));

    app.accounts.delete_account(spare).await.unwrap();
    assert_eq!(app.sessions.current_account_id(), None);
    assert_eq!(app.session.current_user_id(), 1);
}

// =============================================================================
// Transactions and balances
// =============================================================================

#[tokio::test]
async fn test_transactions_move_balance() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    let spent = app
        .transactions
        .add_transaction(expense(account, 250.0))
        .await
        .unwrap();
    assert_eq!(balance(&app, account).await, 9750.0);

    app.transactions
        .add_transaction(NewTransaction {
            category_id: 15,
            description: "Salary".to_string(),
            ..expense(account, 1000.0)
        })
        .await
        .unwrap();
    assert_eq!(balance(&app, account).await, 10750.0);

    // Transfers leave the balance alone
    app.transactions
        .add_transaction(NewTransaction {
            category_id: 22,
            description: "Move".to_string(),
            ..expense(account, 40.0)
        })
        .await
        .unwrap();
    assert_eq!(balance(&app, account).await, 10750.0);

    // Raise the expense from 250 to 300
    let mut edited = app.transactions.get_transaction(spent).await.unwrap().unwrap().transaction;
    edited.amount = 300.0;
    app.transactions.update_transaction(&edited).await.unwrap();
    assert_eq!(balance(&app, account).await, 10700.0);

    assert!(app.transactions.delete_transaction(spent).await.unwrap());
    assert_eq!(balance(&app, account).await, 11000.0);
    assert!(!app.transactions.delete_transaction(spent).await.unwrap());
}

#[tokio::test]
async fn test_moving_transaction_between_accounts() {
    let (app, _dir) = app();
    let admin = app.bootstrap().await.unwrap().unwrap();
    let bank = app
        .accounts
        .add_account(NewAccount {
            user_id: 1,
            username: "Bank".to_string(),
            account_type: AccountType::Bank,
            balance: 500.0,
        })
        .await
        .unwrap();

    let id = app
        .transactions
        .add_transaction(expense(admin, 100.0))
        .await
        .unwrap();
    assert_eq!(balance(&app, admin).await, 9900.0);

    // Move it to the bank account and turn it into income at the same time
    let mut moved = app.transactions.get_transaction(id).await.unwrap().unwrap().transaction;
    moved.account_id = bank;
    moved.category_id = 15;
    moved.amount = 40.0;
    app.transactions.update_transaction(&moved).await.unwrap();

    assert_eq!(balance(&app, admin).await, 10000.0);
    assert_eq!(balance(&app, bank).await, 540.0);
    assert!(app.transactions.get_transactions(admin).next().await.unwrap().unwrap().is_empty());

    app.transactions.delete_transaction(id).await.unwrap();
    assert_eq!(balance(&app, bank).await, 500.0);
}

#[tokio::test]
async fn test_most_used_categories_by_type() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    for category_id in [6, 6, 6, 2, 2, 3, 5, 15, 15, 15, 15] {
        app.transactions
            .add_transaction(NewTransaction {
                category_id,
                ..expense(account, 1.0)
            })
            .await
            .unwrap();
    }

    let top = app
        .transactions
        .most_used_categories(account, CategoryType::Expense, 3)
        .await
        .unwrap();
    let ids: Vec<i64> = top.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![6, 2, 3]);

    let income = app
        .transactions
        .most_used_categories(account, CategoryType::Income, 3)
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert!(app
        .transactions
        .most_used_categories(account, CategoryType::Lend, 3)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_invalid_transaction_writes_nothing() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    for amount in [-5.0, 0.0, f64::NAN] {
        let err = app
            .transactions
            .add_transaction(expense(account, amount))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    let err = app
        .transactions
        .add_transaction(NewTransaction {
            description: "   ".to_string(),
            ..expense(account, 5.0)
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = app
        .transactions
        .add_transaction(NewTransaction {
            category_id: 4242,
            ..expense(account, 5.0)
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(balance(&app, account).await, 10000.0);
    let listed = app.transactions.get_transactions(account).next().await.unwrap().unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_transaction_stream_follows_writes() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    let mut stream = app.transactions.get_transactions(account);
    assert!(stream.next().await.unwrap().unwrap().is_empty());

    app.transactions
        .add_transaction(expense(account, 10.0))
        .await
        .unwrap();

    // A single write can surface as more than one snapshot; wait for the row
    loop {
        let snapshot = stream.next().await.unwrap().unwrap();
        if let Some(first) = snapshot.first() {
            assert_eq!(first.category.title, "Groceries");
            assert_eq!(first.account.id, account);
            break;
        }
    }
}

// =============================================================================
// Counterparties, locations, events
// =============================================================================

#[tokio::test]
async fn test_payee_dedupe_and_search() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    let mut ids = Vec::new();
    for name in ["Bob", "Andy", "Diana", "anna"] {
        let payee = app
            .counterparties
            .add_payee(
                account,
                NewPayee {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ids.push(payee.id);
    }

    let again = app
        .counterparties
        .add_payee(
            account,
            NewPayee {
                name: " Bob ".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(again.id, ids[0]);

    let found = app
        .counterparties
        .search_payees_by_type(account, "an", PayeeType::Payee)
        .next()
        .await
        .unwrap()
        .unwrap();
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Andy", "Diana", "anna"]);

    // Wildcards in a query are literal characters
    let found = app
        .counterparties
        .search_payees_by_type(account, "%", PayeeType::Payee)
        .next()
        .await
        .unwrap()
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_lender_linked_to_transaction() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    let lender = app
        .counterparties
        .add_lender(
            account,
            tally_core::models::NewCounterparty {
                name: "Carol".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let id = app
        .transactions
        .add_transaction(NewTransaction {
            category_id: 21,
            description: "Loan".to_string(),
            lender_id: Some(lender.id),
            ..expense(account, 100.0)
        })
        .await
        .unwrap();

    let details = app.transactions.get_transaction(id).await.unwrap().unwrap();
    assert_eq!(details.lender.unwrap().name, "Carol");
    assert_eq!(details.category.category_type, CategoryType::Borrowing);
    assert_eq!(balance(&app, account).await, 10100.0);
}

#[tokio::test]
async fn test_location_validation_and_dedupe() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();

    let park = app
        .locations
        .add_location(account, "Park", Some((52.5, 13.4)))
        .await
        .unwrap();
    let again = app.locations.add_location(account, "Park", None).await.unwrap();
    assert_eq!(park.id, again.id);

    let err = app
        .locations
        .add_location(account, "Nowhere", Some((120.0, 0.0)))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let mut moved = park.clone();
    moved.name = "  City park ".to_string();
    moved.latitude = Some(48.0);
    moved.longitude = Some(2.0);
    app.locations.update_location(&moved).await.unwrap();
    let stored = app.locations.get_location(park.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "City park");
    assert_eq!(stored.latitude, Some(48.0));

    for bad in [
        Location {
            name: " ".to_string(),
            ..stored.clone()
        },
        Location {
            longitude: Some(200.0),
            ..stored.clone()
        },
        Location {
            longitude: None,
            ..stored.clone()
        },
    ] {
        let err = app.locations.update_location(&bad).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert_eq!(app.locations.get_location(park.id).await.unwrap().unwrap(), stored);
}

#[tokio::test]
async fn test_event_with_participants() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();
    let start = timestamp_now();

    let err = app
        .events
        .add_event(NewEvent {
            name: "Trip".to_string(),
            start_date: start,
            end_date: Some(start - Duration::days(1)),
            participant_count: None,
            account_id: account,
            participants: vec![],
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let id = app
        .events
        .add_event(NewEvent {
            name: "Trip".to_string(),
            start_date: start,
            end_date: Some(start + Duration::days(3)),
            participant_count: None,
            account_id: account,
            participants: vec!["Zed".to_string(), " ".to_string(), "Amy".to_string()],
        })
        .await
        .unwrap();

    let event = app.events.get_event(id).await.unwrap().unwrap();
    assert_eq!(event.participants, vec!["Zed", "Amy"]);
    assert_eq!(event.participant_count, 2);

    let with = app
        .events
        .get_event_with_participants(id)
        .next()
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(with.participants.len(), 2);

    let found = app
        .events
        .search_events(account, "tri")
        .next()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert!(app
        .events
        .search_events(account, "party")
        .next()
        .await
        .unwrap()
        .unwrap()
        .is_empty());
}

// =============================================================================
// Categories, contacts, images, reports
// =============================================================================

#[tokio::test]
async fn test_category_parent_must_exist() {
    let (app, _dir) = app();
    app.bootstrap().await.unwrap();

    let mut groceries = app.categories.get_category_by_id(2).await.unwrap().unwrap();
    groceries.parent_id = Some(999);
    assert!(app
        .categories
        .update_category(&groceries)
        .await
        .unwrap_err()
        .is_validation());

    let mut food = app.categories.get_category_by_id(1).await.unwrap().unwrap();
    food.parent_id = Some(2);
    assert!(app
        .categories
        .update_category(&food)
        .await
        .unwrap_err()
        .is_validation());
}

#[tokio::test]
async fn test_contacts_sorted_by_name() {
    let (app, _dir) = app();
    let contacts = app.contacts.get_all_phone_contacts().await.unwrap();
    let names: Vec<&str> = contacts.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "bob"]);
}

#[tokio::test]
async fn test_images_saved_attached_and_removed() {
    let (app, dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();
    let id = app
        .transactions
        .add_transaction(expense(account, 5.0))
        .await
        .unwrap();

    let capture = app.attachments.create_temp_file().await.unwrap();
    std::fs::write(&capture, b"jpg").unwrap();
    let saved = app.attachments.save_image(&capture).await.unwrap();
    let stored = dir.path().join(&saved.file_path);
    assert!(stored.exists());
    assert_eq!(saved.file_size, 3);

    let ids = app.attachments.attach_images(id, &[saved]).await.unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(app.attachments.get_images(id).await.unwrap().len(), 1);

    assert!(app
        .attachments
        .attach_images(0, &[])
        .await
        .unwrap_err()
        .is_validation());

    app.transactions.delete_transaction(id).await.unwrap();
    assert!(!stored.exists());
    assert!(app.attachments.get_images(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_images_outside_storage_are_not_attached() {
    let (app, _dir) = app();
    let outside = TempDir::new().unwrap();
    let account = app.bootstrap().await.unwrap().unwrap();
    let id = app
        .transactions
        .add_transaction(expense(account, 5.0))
        .await
        .unwrap();

    let source = outside.path().join("receipt.jpg");
    std::fs::write(&source, b"jpg").unwrap();
    let saved = app.attachments.save_image(&source).await.unwrap();

    let victim = outside.path().join("victim.txt");
    std::fs::write(&victim, b"keep").unwrap();
    let escaped = [
        TransactionImage {
            file_path: victim.to_string_lossy().to_string(),
            ..saved.clone()
        },
        TransactionImage {
            file_path: format!("{}/../../victim.txt", IMAGES_SUBDIR),
            ..saved.clone()
        },
    ];
    for image in &escaped {
        let err = app.attachments.attach_images(id, &[image.clone()]).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert!(app.attachments.get_images(id).await.unwrap().is_empty());

    app.transactions.delete_transaction(id).await.unwrap();
    assert!(victim.exists());
}

#[tokio::test]
async fn test_home_report_over_range() {
    let (app, _dir) = app();
    let account = app.bootstrap().await.unwrap().unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();

    for (category_id, amount) in [(2, 60.0), (6, 40.0), (15, 500.0)] {
        app.transactions
            .add_transaction(NewTransaction {
                category_id,
                created_at: at,
                ..expense(account, amount)
            })
            .await
            .unwrap();
    }

    let from = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
    let report = app.reports.home_report(account, from, to).await.unwrap();
    assert_eq!(report.income, 500.0);
    assert_eq!(report.expense, 100.0);
    assert_eq!(report.difference, 400.0);
    assert!(report.has_data);
    assert_eq!(report.top_categories[0].percentage, 60.0);

    let mut live = app.reports.watch_home_report(account, from, to).unwrap();
    assert_eq!(live.next().await.unwrap().unwrap(), report);

    let months = app
        .reports
        .monthly_expenses(account, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), to)
        .await
        .unwrap();
    let amounts: Vec<f64> = months.iter().map(|m| m.amount).collect();
    assert_eq!(amounts, vec![0.0, 0.0, 100.0]);

    assert!(app.reports.home_report(account, to, from).await.is_err());
}

//! Database tests

use super::rows::*;
use super::*;
use crate::error::Error;

fn setup() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    db.upsert_user(&UserRow {
        id: 1,
        name: "Admin".to_string(),
        email: None,
        auth_uid: None,
        created_at: 1_000,
        updated_at: 1_000,
    })
    .unwrap();
    let account_id = add_account(&db, "Admin", 100.0);
    db.seed_categories().unwrap();
    (db, account_id)
}

fn add_account(db: &Database, username: &str, balance: f64) -> i64 {
    db.upsert_account(&AccountRow {
        id: 0,
        user_id: 1,
        username: username.to_string(),
        account_type: "cash".to_string(),
        balance,
        created_at: 1_000,
    })
    .unwrap()
}

fn transaction(account_id: i64, category_id: i64, created_at: i64) -> TransactionRow {
    TransactionRow {
        id: 0,
        amount: 12.5,
        created_at,
        description: "Lunch".to_string(),
        category_id,
        account_id,
        event_id: None,
        location_id: None,
        lender_id: None,
        borrower_id: None,
    }
}

fn payee(account_id: i64, name: &str) -> PayeeRow {
    PayeeRow {
        id: 0,
        name: name.to_string(),
        account_id,
        payee_type: "payee".to_string(),
        is_from_contacts: false,
        contact_id: None,
        phone_number: None,
        email: None,
        notes: None,
    }
}

fn image(transaction_id: i64, name: &str) -> TransactionImageRow {
    TransactionImageRow {
        id: 0,
        transaction_id,
        file_path: format!("transaction_images/{}", name),
        file_name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        file_size: 3,
        created_at: 2_000,
    }
}

fn count(db: &Database, table: &str) -> i64 {
    db.conn()
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_schema_version_is_stored() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_version_mismatch_recreates_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");
    let path = path.to_string_lossy().to_string();

    {
        let db = Database::new(&path).unwrap();
        db.seed_categories().unwrap();
        db.conn()
            .unwrap()
            .execute_batch("PRAGMA user_version = 2;")
            .unwrap();
    }

    let db = Database::new(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    assert_eq!(db.count_categories().unwrap(), 0);
}

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");
    let path = path.to_string_lossy().to_string();

    Database::new(&path).unwrap().seed_categories().unwrap();
    let db = Database::new(&path).unwrap();
    assert_eq!(db.count_categories().unwrap(), SEED_CATEGORIES.len() as i64);
}

#[test]
fn test_seed_categories_once() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.seed_categories().unwrap(), 23);
    assert_eq!(db.seed_categories().unwrap(), 0);
    assert_eq!(db.count_categories().unwrap(), 23);

    let groceries = db.get_category(2).unwrap().unwrap();
    assert_eq!(groceries.parent_id, Some(1));
    assert_eq!(groceries.category_type, "expense");

    let income = db.list_categories_by_type("income").unwrap();
    assert_eq!(income.len(), 5);
    let mixed = db.list_categories_by_types(&["lend", "borrowing"]).unwrap();
    assert_eq!(mixed.len(), 2);
}

#[test]
fn test_category_cycles_rejected() {
    let (db, _) = setup();

    // 1 -> 2 already; making 1 a child of 2 closes the loop
    let mut food = db.get_category(1).unwrap().unwrap();
    food.parent_id = Some(2);
    let err = db.update_category(&food).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    food.parent_id = Some(1);
    assert!(db.update_category(&food).unwrap_err().is_validation());

    // Unrelated parent is fine
    food.parent_id = Some(7);
    db.update_category(&food).unwrap();
    assert_eq!(db.get_category(1).unwrap().unwrap().parent_id, Some(7));
}

#[test]
fn test_category_search_and_usage() {
    let (db, account_id) = setup();

    let found = db.search_categories_by_type("expense", "%res%").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Restaurants");

    db.insert_transaction(&transaction(account_id, 3, 10), &[])
        .unwrap();
    db.insert_transaction(&transaction(account_id, 3, 20), &[])
        .unwrap();
    db.insert_transaction(&transaction(account_id, 15, 30), &[])
        .unwrap();

    let used = db
        .list_used_categories_by_type(account_id, "expense")
        .unwrap();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].id, 3);

    let usage = db.category_usage(account_id).unwrap();
    let restaurants = usage.iter().find(|(c, _)| c.id == 3).unwrap();
    assert_eq!(restaurants.1, 2);
}

#[test]
fn test_account_balance_and_total() {
    let (db, account_id) = setup();
    add_account(&db, "Savings", 50.0);

    db.adjust_account_balance(account_id, -30.0).unwrap();
    assert_eq!(db.get_account(account_id).unwrap().unwrap().balance, 70.0);
    assert_eq!(db.total_balance(1).unwrap(), 120.0);
    assert_eq!(db.total_balance(99).unwrap(), 0.0);
}

#[test]
fn test_account_delete_cascades() {
    let (db, account_id) = setup();

    let payee_id = db.upsert_payee(&payee(account_id, "Ann")).unwrap();
    let location_id = db
        .upsert_location(&LocationRow {
            id: 0,
            name: "Market".to_string(),
            account_id,
            latitude: None,
            longitude: None,
        })
        .unwrap();
    let tx = TransactionRow {
        location_id: Some(location_id),
        ..transaction(account_id, 2, 10)
    };
    let tx_id = db.insert_transaction(&tx, &[payee_id]).unwrap();
    db.insert_image(&image(tx_id, "IMG_1.jpg")).unwrap();

    db.delete_account(account_id).unwrap();

    for table in [
        "transactions",
        "transaction_payees",
        "transaction_images",
        "payees",
        "locations",
    ] {
        assert_eq!(count(&db, table), 0, "{} should be empty", table);
    }
    // Categories are global
    assert_eq!(count(&db, "categories"), 23);
}

#[test]
fn test_transaction_delete_cascades_links_and_images() {
    let (db, account_id) = setup();
    let ann = db.upsert_payee(&payee(account_id, "Ann")).unwrap();
    let tx_id = db
        .insert_transaction(&transaction(account_id, 2, 10), &[ann])
        .unwrap();
    db.insert_images(&[image(tx_id, "a.jpg"), image(tx_id, "b.jpg")])
        .unwrap();

    db.delete_transaction(tx_id).unwrap();

    assert!(db.get_transaction(tx_id).unwrap().is_none());
    assert!(db.list_images(tx_id).unwrap().is_empty());
    assert_eq!(count(&db, "transaction_payees"), 0);
    // The payee itself survives
    assert!(db.get_payee(ann).unwrap().is_some());
}

#[test]
fn test_optional_references_set_null_on_delete() {
    let (db, account_id) = setup();
    let location_id = db
        .upsert_location(&LocationRow {
            id: 0,
            name: "Cafe".to_string(),
            account_id,
            latitude: Some(1.0),
            longitude: Some(2.0),
        })
        .unwrap();
    let tx = TransactionRow {
        location_id: Some(location_id),
        ..transaction(account_id, 3, 10)
    };
    let tx_id = db.insert_transaction(&tx, &[]).unwrap();

    db.delete_location(location_id).unwrap();

    let row = db.get_transaction(tx_id).unwrap().unwrap();
    assert_eq!(row.location_id, None);
}

#[test]
fn test_transaction_details_join() {
    let (db, account_id) = setup();
    let ann = db.upsert_payee(&payee(account_id, "Ann")).unwrap();
    let bob = db.upsert_payee(&payee(account_id, "Bob")).unwrap();
    let lender_id = db
        .upsert_counterparty(
            CounterpartyTable::Lenders,
            &CounterpartyRow {
                id: 0,
                name: "Carol".to_string(),
                phone_number: None,
                email: None,
                account_id,
                notes: None,
            },
        )
        .unwrap();

    let tx = TransactionRow {
        lender_id: Some(lender_id),
        ..transaction(account_id, 20, 10)
    };
    let with_links = db.insert_transaction(&tx, &[bob, ann]).unwrap();
    let bare = db
        .insert_transaction(&transaction(account_id, 2, 20), &[])
        .unwrap();

    let details = db.list_transaction_details(account_id).unwrap();
    assert_eq!(details.len(), 2);
    // Newest first
    assert_eq!(details[0].transaction.id, bare);
    assert!(details[0].payees.is_empty());
    assert!(details[0].event.is_none());
    assert!(details[0].lender.is_none());

    let linked = db.get_transaction_details(with_links).unwrap().unwrap();
    assert_eq!(linked.category.title, "Lend");
    assert_eq!(linked.account.username, "Admin");
    assert_eq!(linked.lender.as_ref().unwrap().name, "Carol");
    let names: Vec<&str> = linked.payees.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Ann"]);
}

#[test]
fn test_details_in_range_is_inclusive() {
    let (db, account_id) = setup();
    for at in [100, 200, 300] {
        db.insert_transaction(&transaction(account_id, 2, at), &[])
            .unwrap();
    }

    let range = db
        .list_transaction_details_in_range(account_id, 100, 200)
        .unwrap();
    let times: Vec<i64> = range.iter().map(|d| d.transaction.created_at).collect();
    assert_eq!(times, vec![200, 100]);
}

#[test]
fn test_upsert_keeps_children() {
    let (db, account_id) = setup();
    let tx_id = db
        .insert_transaction(&transaction(account_id, 2, 10), &[])
        .unwrap();
    db.insert_image(&image(tx_id, "keep.jpg")).unwrap();

    let renamed = TransactionRow {
        id: tx_id,
        description: "Dinner".to_string(),
        ..transaction(account_id, 2, 10)
    };
    assert_eq!(db.insert_transaction(&renamed, &[]).unwrap(), tx_id);

    assert_eq!(db.list_images(tx_id).unwrap().len(), 1);
    assert_eq!(
        db.get_transaction(tx_id).unwrap().unwrap().description,
        "Dinner"
    );
}

#[test]
fn test_update_transaction_replaces_payees() {
    let (db, account_id) = setup();
    let ann = db.upsert_payee(&payee(account_id, "Ann")).unwrap();
    let bob = db.upsert_payee(&payee(account_id, "Bob")).unwrap();
    let tx_id = db
        .insert_transaction(&transaction(account_id, 2, 10), &[ann])
        .unwrap();

    let row = db.get_transaction(tx_id).unwrap().unwrap();
    db.update_transaction(&row, &[bob]).unwrap();

    assert_eq!(db.get_transaction_payee_ids(tx_id).unwrap(), vec![bob]);
}

#[test]
fn test_foreign_key_violation_is_an_error() {
    let (db, account_id) = setup();
    let result = db.insert_transaction(&transaction(account_id, 999, 10), &[]);
    assert!(matches!(result, Err(Error::Database(_))));
    assert_eq!(db.count_transactions(account_id).unwrap(), 0);
}

#[test]
fn test_payee_search_and_exact_name() {
    let (db, account_id) = setup();
    for name in ["Bob", "Andy", "Diana", "anna"] {
        db.upsert_payee(&payee(account_id, name)).unwrap();
    }

    let found = db
        .search_payees_by_type(account_id, "%an%", "payee")
        .unwrap();
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Andy", "Diana", "anna"]);

    assert!(db
        .get_payee_by_name(account_id, "Anna", "payee")
        .unwrap()
        .is_none());
    assert!(db
        .get_payee_by_name(account_id, "anna", "payee")
        .unwrap()
        .is_some());
    assert!(db
        .get_payee_by_name(account_id, "anna", "lender")
        .unwrap()
        .is_none());
}

#[test]
fn test_recent_payees_exclude_contacts() {
    let (db, account_id) = setup();
    db.upsert_payee(&payee(account_id, "Typed")).unwrap();
    db.upsert_payee(&PayeeRow {
        is_from_contacts: true,
        contact_id: Some(7),
        ..payee(account_id, "From book")
    })
    .unwrap();

    let recent = db.list_recent_payees_by_type(account_id, "payee").unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].name, "Typed");
    assert_eq!(db.list_payees_by_type(account_id, "payee").unwrap().len(), 2);
}

#[test]
fn test_lenders_and_borrowers_are_separate() {
    let (db, account_id) = setup();
    let party = CounterpartyRow {
        id: 0,
        name: "Eve".to_string(),
        phone_number: Some("555".to_string()),
        email: None,
        account_id,
        notes: None,
    };
    db.upsert_counterparty(CounterpartyTable::Lenders, &party)
        .unwrap();

    assert!(db
        .get_counterparty_by_name(CounterpartyTable::Lenders, account_id, "Eve")
        .unwrap()
        .is_some());
    assert!(db
        .get_counterparty_by_name(CounterpartyTable::Borrowers, account_id, "Eve")
        .unwrap()
        .is_none());
}

#[test]
fn test_event_participants_keep_order() {
    let (db, account_id) = setup();
    let event = EventWithParticipantsRow {
        event: EventRow {
            id: 0,
            name: "Trip".to_string(),
            start_date: 1_000,
            end_date: None,
            participant_count: 3,
            account_id,
            is_active: true,
        },
        participants: ["Zed", "Amy", "Max"]
            .iter()
            .enumerate()
            .map(|(i, name)| EventParticipantRow {
                id: 0,
                event_id: 0,
                position: i as i32,
                name: name.to_string(),
            })
            .collect(),
    };
    let id = db.upsert_event(&event).unwrap();

    let loaded = db.get_event_with_participants(id).unwrap().unwrap();
    let names: Vec<&str> = loaded.participants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Zed", "Amy", "Max"]);

    let mut shorter = loaded.clone();
    shorter.participants.truncate(1);
    db.update_event(&shorter).unwrap();
    assert_eq!(db.list_event_participants(id).unwrap().len(), 1);

    db.delete_event(id).unwrap();
    assert_eq!(count(&db, "event_participants"), 0);
}

#[test]
fn test_location_lookup() {
    let (db, account_id) = setup();
    for name in ["Park", "Parking lot", "Office"] {
        db.upsert_location(&LocationRow {
            id: 0,
            name: name.to_string(),
            account_id,
            latitude: None,
            longitude: None,
        })
        .unwrap();
    }

    assert_eq!(db.search_locations(account_id, "%park%").unwrap().len(), 2);
    assert!(db
        .get_location_by_name(account_id, "park")
        .unwrap()
        .is_none());
    let names: Vec<String> = db
        .list_locations(account_id)
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Office", "Park", "Parking lot"]);
}

#[test]
fn test_delete_images_for_transaction_counts_rows() {
    let (db, account_id) = setup();
    let tx_id = db
        .insert_transaction(&transaction(account_id, 2, 10), &[])
        .unwrap();
    let ids = db
        .insert_images(&[image(tx_id, "a.jpg"), image(tx_id, "b.jpg")])
        .unwrap();
    assert_eq!(ids.len(), 2);

    assert_eq!(db.delete_images_for_transaction(tx_id).unwrap(), 2);
    assert_eq!(db.delete_images_for_transaction(tx_id).unwrap(), 0);
}

#[tokio::test]
async fn test_watch_emits_on_relevant_writes() {
    let (db, account_id) = setup();
    let mut accounts = db.watch(&[Table::Accounts], move |db| {
        Ok(db.list_accounts_by_user(1)?.len())
    });

    assert_eq!(accounts.next().await.unwrap().unwrap(), 1);

    // Unrelated write: no snapshot
    db.upsert_payee(&payee(account_id, "Ann")).unwrap();
    add_account(&db, "Second", 0.0);
    assert_eq!(accounts.next().await.unwrap().unwrap(), 2);
}

#[tokio::test]
async fn test_watch_sees_cascaded_deletes() {
    let (db, account_id) = setup();
    db.insert_transaction(&transaction(account_id, 2, 10), &[])
        .unwrap();

    let mut count_stream = db.watch(&[Table::Transactions], move |db| {
        db.count_transactions(account_id)
    });
    assert_eq!(count_stream.next().await.unwrap().unwrap(), 1);

    db.delete_category(2).unwrap();
    assert_eq!(count_stream.next().await.unwrap().unwrap(), 0);
}

#[tokio::test]
async fn test_watch_error_ends_stream() {
    let db = Database::in_memory().unwrap();
    let mut failing = db.watch(&[Table::Users], |db| {
        let conn = db.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM no_such_table", [], |row| row.get(0))?;
        Ok(n)
    });

    assert!(failing.next().await.unwrap().is_err());
    assert!(failing.next().await.is_none());
}

#[tokio::test]
async fn test_dropped_subscription_stops_watcher() {
    let (db, account_id) = setup();
    let idle = db.active_watchers();

    let mut accounts = db.watch(&[Table::Accounts], |db| Ok(db.list_accounts_by_user(1)?.len()));
    assert_eq!(accounts.next().await.unwrap().unwrap(), 1);
    assert_eq!(db.active_watchers(), idle + 1);

    drop(accounts);
    let stopped = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while db.active_watchers() > idle {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(stopped.is_ok(), "watcher task still running after drop");

    // Writes carry on with nobody listening
    add_account(&db, "Later", 0.0);
    db.upsert_payee(&payee(account_id, "Ann")).unwrap();
}

#[tokio::test]
async fn test_subscribers_get_independent_snapshots() {
    let (db, _) = setup();
    let query = |db: &Database| -> Result<usize> { Ok(db.list_accounts_by_user(1)?.len()) };
    let mut first = db.watch(&[Table::Accounts], query);
    let mut second = db.watch(&[Table::Accounts], query);

    assert_eq!(first.next().await.unwrap().unwrap(), 1);
    assert_eq!(second.next().await.unwrap().unwrap(), 1);

    add_account(&db, "Second", 0.0);
    assert_eq!(first.next().await.unwrap().unwrap(), 2);
    assert_eq!(second.next().await.unwrap().unwrap(), 2);

    // One subscriber leaving does not affect the other
    drop(first);
    add_account(&db, "Third", 0.0);
    assert_eq!(second.next().await.unwrap().unwrap(), 3);
}

#[test]
fn test_in_memory_database_cleans_up() {
    let db = Database::in_memory().unwrap();
    let path = std::path::PathBuf::from(db.path());
    assert!(path.exists());

    let clone = db.clone();
    drop(db);
    assert!(path.exists());

    drop(clone);
    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

#[test]
fn test_event_search_matches_name() {
    let (db, account_id) = setup();
    for (name, start) in [("Ski trip", 10), ("Road trip", 20), ("Birthday", 30)] {
        db.upsert_event(&EventWithParticipantsRow {
            event: EventRow {
                id: 0,
                name: name.to_string(),
                start_date: start,
                end_date: None,
                participant_count: 0,
                account_id,
                is_active: true,
            },
            participants: vec![],
        })
        .unwrap();
    }

    let found = db.search_events_by_account(account_id, "%TRIP%").unwrap();
    let names: Vec<&str> = found.iter().map(|e| e.event.name.as_str()).collect();
    assert_eq!(names, vec!["Road trip", "Ski trip"]);
    assert!(db.search_events_by_account(account_id + 1, "%trip%").unwrap().is_empty());
}

#[test]
fn test_escaped_wildcards_match_literally() {
    let (db, account_id) = setup();
    db.upsert_payee(&payee(account_id, "50% off")).unwrap();
    db.upsert_payee(&payee(account_id, "Route 500")).unwrap();
    db.upsert_payee(&payee(account_id, "a_b")).unwrap();
    db.upsert_payee(&payee(account_id, "axb")).unwrap();

    let literal = db
        .search_payees_by_type(account_id, "%50\\%%", "payee")
        .unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].name, "50% off");

    let underscore = db
        .search_payees_by_type(account_id, "%a\\_b%", "payee")
        .unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "a_b");
}

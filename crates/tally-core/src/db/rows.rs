//! Persisted row shapes, one per table
//!
//! Rows mirror the columns exactly: timestamps are epoch milliseconds and
//! enums are their stored text. Conversion to domain models lives in
//! `crate::mapper`.

use rusqlite::Row;

pub(crate) const USER_COLUMNS: &[&str] =
    &["id", "name", "email", "auth_uid", "created_at", "updated_at"];
pub(crate) const ACCOUNT_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "username",
    "account_type",
    "balance",
    "created_at",
];
pub(crate) const CATEGORY_COLUMNS: &[&str] = &["id", "parent_id", "title", "icon", "category_type"];
pub(crate) const EVENT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "start_date",
    "end_date",
    "participant_count",
    "account_id",
    "is_active",
];
pub(crate) const LOCATION_COLUMNS: &[&str] = &["id", "name", "account_id", "latitude", "longitude"];
pub(crate) const PAYEE_COLUMNS: &[&str] = &[
    "id",
    "name",
    "account_id",
    "payee_type",
    "is_from_contacts",
    "contact_id",
    "phone_number",
    "email",
    "notes",
];
pub(crate) const PAYEE_TRANSACTION_COLUMNS: &[&str] =
    &["id", "name", "account_id", "is_from_contacts", "contact_id"];
pub(crate) const COUNTERPARTY_COLUMNS: &[&str] =
    &["id", "name", "phone_number", "email", "account_id", "notes"];
pub(crate) const TRANSACTION_COLUMNS: &[&str] = &[
    "id",
    "amount",
    "created_at",
    "description",
    "category_id",
    "account_id",
    "event_id",
    "location_id",
    "lender_id",
    "borrower_id",
];
pub(crate) const IMAGE_COLUMNS: &[&str] = &[
    "id",
    "transaction_id",
    "file_path",
    "file_name",
    "mime_type",
    "file_size",
    "created_at",
];

/// Build a comma-separated select list, optionally qualified with a table alias
pub(crate) fn select_list(alias: Option<&str>, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| match alias {
            Some(a) => format!("{}.{}", a, c),
            None => (*c).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// True when the id column at `at` is NULL (unmatched LEFT JOIN)
fn is_null(row: &Row, at: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<i64>>(at)?.is_none())
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub auth_uid: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            email: row.get(at + 2)?,
            auth_uid: row.get(at + 3)?,
            created_at: row.get(at + 4)?,
            updated_at: row.get(at + 5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub account_type: String,
    pub balance: f64,
    pub created_at: i64,
}

impl AccountRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            user_id: row.get(at + 1)?,
            username: row.get(at + 2)?,
            account_type: row.get(at + 3)?,
            balance: row.get(at + 4)?,
            created_at: row.get(at + 5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub icon: String,
    pub category_type: String,
}

impl CategoryRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            parent_id: row.get(at + 1)?,
            title: row.get(at + 2)?,
            icon: row.get(at + 3)?,
            category_type: row.get(at + 4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub id: i64,
    pub name: String,
    pub start_date: i64,
    pub end_date: Option<i64>,
    pub participant_count: i32,
    pub account_id: i64,
    pub is_active: bool,
}

impl EventRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            start_date: row.get(at + 2)?,
            end_date: row.get(at + 3)?,
            participant_count: row.get(at + 4)?,
            account_id: row.get(at + 5)?,
            is_active: row.get(at + 6)?,
        })
    }

    pub(crate) fn read_optional(row: &Row, at: usize) -> rusqlite::Result<Option<Self>> {
        if is_null(row, at)? {
            return Ok(None);
        }
        Self::read(row, at).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventParticipantRow {
    pub id: i64,
    pub event_id: i64,
    pub position: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventWithParticipantsRow {
    pub event: EventRow,
    /// Ordered by position
    pub participants: Vec<EventParticipantRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            account_id: row.get(at + 2)?,
            latitude: row.get(at + 3)?,
            longitude: row.get(at + 4)?,
        })
    }

    pub(crate) fn read_optional(row: &Row, at: usize) -> rusqlite::Result<Option<Self>> {
        if is_null(row, at)? {
            return Ok(None);
        }
        Self::read(row, at).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayeeRow {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub payee_type: String,
    pub is_from_contacts: bool,
    pub contact_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl PayeeRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            account_id: row.get(at + 2)?,
            payee_type: row.get(at + 3)?,
            is_from_contacts: row.get(at + 4)?,
            contact_id: row.get(at + 5)?,
            phone_number: row.get(at + 6)?,
            email: row.get(at + 7)?,
            notes: row.get(at + 8)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayeeTransactionRow {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub is_from_contacts: bool,
    pub contact_id: Option<i64>,
}

impl PayeeTransactionRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            account_id: row.get(at + 2)?,
            is_from_contacts: row.get(at + 3)?,
            contact_id: row.get(at + 4)?,
        })
    }
}

/// Shared shape of the `lenders` and `borrowers` tables
#[derive(Debug, Clone, PartialEq)]
pub struct CounterpartyRow {
    pub id: i64,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub account_id: i64,
    pub notes: Option<String>,
}

impl CounterpartyRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            phone_number: row.get(at + 2)?,
            email: row.get(at + 3)?,
            account_id: row.get(at + 4)?,
            notes: row.get(at + 5)?,
        })
    }

    pub(crate) fn read_optional(row: &Row, at: usize) -> rusqlite::Result<Option<Self>> {
        if is_null(row, at)? {
            return Ok(None);
        }
        Self::read(row, at).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: i64,
    pub amount: f64,
    pub created_at: i64,
    pub description: String,
    pub category_id: i64,
    pub account_id: i64,
    pub event_id: Option<i64>,
    pub location_id: Option<i64>,
    pub lender_id: Option<i64>,
    pub borrower_id: Option<i64>,
}

impl TransactionRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            amount: row.get(at + 1)?,
            created_at: row.get(at + 2)?,
            description: row.get(at + 3)?,
            category_id: row.get(at + 4)?,
            account_id: row.get(at + 5)?,
            event_id: row.get(at + 6)?,
            location_id: row.get(at + 7)?,
            lender_id: row.get(at + 8)?,
            borrower_id: row.get(at + 9)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPayeeRow {
    pub id: i64,
    pub transaction_id: i64,
    pub payee_id: i64,
}

/// A transaction joined with everything it references
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionWithDetailsRow {
    pub transaction: TransactionRow,
    pub category: CategoryRow,
    pub account: AccountRow,
    pub event: Option<EventWithParticipantsRow>,
    pub location: Option<LocationRow>,
    pub lender: Option<CounterpartyRow>,
    pub borrower: Option<CounterpartyRow>,
    /// Ordered by join-row insertion
    pub payees: Vec<PayeeRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionImageRow {
    pub id: i64,
    pub transaction_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: i64,
}

impl TransactionImageRow {
    pub(crate) fn read(row: &Row, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            transaction_id: row.get(at + 1)?,
            file_path: row.get(at + 2)?,
            file_name: row.get(at + 3)?,
            mime_type: row.get(at + 4)?,
            file_size: row.get(at + 5)?,
            created_at: row.get(at + 6)?,
        })
    }
}

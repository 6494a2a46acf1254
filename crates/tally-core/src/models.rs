//! Domain models for Tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current time truncated to the millisecond precision the store keeps
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A person using the app. One user owns many accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    /// Identifier from an external auth provider, once one is wired up
    pub auth_uid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ledger/wallet holding a balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub account_type: AccountType,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

/// Account kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Cash,
    Bank,
    Credit,
    EWallet,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Credit => "credit",
            Self::EWallet => "e_wallet",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "bank" => Ok(Self::Bank),
            "credit" => Ok(Self::Credit),
            "e_wallet" | "ewallet" | "e-wallet" => Ok(Self::EWallet),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a category, which decides how a transaction moves the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    #[default]
    Expense,
    Income,
    Lend,
    Borrowing,
    Transfer,
    Adjustment,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Lend => "lend",
            Self::Borrowing => "borrowing",
            Self::Transfer => "transfer",
            Self::Adjustment => "adjustment",
        }
    }

    /// Signed effect of a transaction of `amount` on its account balance
    pub fn balance_change(&self, amount: f64) -> f64 {
        match self {
            Self::Income | Self::Borrowing => amount,
            Self::Expense | Self::Lend => -amount,
            Self::Transfer | Self::Adjustment => 0.0,
        }
    }

    pub fn all() -> &'static [CategoryType] {
        &[
            Self::Expense,
            Self::Income,
            Self::Lend,
            Self::Borrowing,
            Self::Transfer,
            Self::Adjustment,
        ]
    }
}

impl std::str::FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "lend" => Ok(Self::Lend),
            "borrowing" | "borrow" => Ok(Self::Borrowing),
            "transfer" => Ok(Self::Transfer),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(format!("Unknown category type: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classification tag for transactions, optionally nested under a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    /// Icon reference resolved by the presentation layer
    pub icon: String,
    pub category_type: CategoryType,
}

/// A named activity/trip grouping related transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub participant_count: i32,
    pub account_id: i64,
    pub is_active: bool,
    /// Participant names in insertion order
    pub participants: Vec<String>,
}

/// One participant row of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParticipant {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithParticipants {
    pub event: Event,
    pub participants: Vec<EventParticipant>,
}

/// Where a transaction happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Role of a payee record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayeeType {
    #[default]
    Payee,
    Lender,
    Borrower,
}

impl PayeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payee => "payee",
            Self::Lender => "lender",
            Self::Borrower => "borrower",
        }
    }
}

impl std::str::FromStr for PayeeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "payee" => Ok(Self::Payee),
            "lender" => Ok(Self::Lender),
            "borrower" => Ok(Self::Borrower),
            _ => Err(format!("Unknown payee type: {}", s)),
        }
    }
}

impl std::fmt::Display for PayeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A counterparty attached to transactions, optionally linked to a device contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub payee_type: PayeeType,
    pub is_from_contacts: bool,
    pub contact_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// A lightweight payee list entry kept per account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeTransaction {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub is_from_contacts: bool,
    pub contact_id: Option<i64>,
}

/// A person money is borrowed from or lent to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: i64,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub account_id: i64,
    pub notes: Option<String>,
}

pub type Lender = Counterparty;
pub type Borrower = Counterparty;

/// A money movement on an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub category_id: i64,
    pub account_id: i64,
    pub event_id: Option<i64>,
    pub location_id: Option<i64>,
    pub lender_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub payee_ids: Vec<i64>,
}

/// A transaction with its related rows resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction: Transaction,
    pub category: Category,
    pub account: Account,
    pub event: Option<Event>,
    pub location: Option<Location>,
    pub lender: Option<Lender>,
    pub borrower: Option<Borrower>,
    pub payees: Vec<Payee>,
}

/// Image file attached to a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionImage {
    pub id: i64,
    /// 0 until the image is attached to a saved transaction
    pub transaction_id: i64,
    /// Path relative to the data directory
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// A contact read from the device address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneContact {
    pub id: i64,
    pub display_name: String,
}

// ========== Use-case inputs ==========

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: i64,
    pub username: String,
    pub account_type: AccountType,
    pub balance: f64,
}

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub category_id: i64,
    pub account_id: i64,
    pub event_id: Option<i64>,
    pub location_id: Option<i64>,
    pub lender_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub payee_ids: Vec<i64>,
}

/// Input for creating a payee
#[derive(Debug, Clone, Default)]
pub struct NewPayee {
    pub name: String,
    pub payee_type: PayeeType,
    pub is_from_contacts: bool,
    pub contact_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Input for creating a lender or borrower
#[derive(Debug, Clone, Default)]
pub struct NewCounterparty {
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Defaults to the number of participant names
    pub participant_count: Option<i32>,
    pub account_id: i64,
    pub participants: Vec<String>,
}

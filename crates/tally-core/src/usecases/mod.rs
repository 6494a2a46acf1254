//! Use cases, one method per user intent
//!
//! Preconditions are checked first and fail with [`Error::Validation`]
//! before anything touches storage.
//!
//! [`Error::Validation`]: crate::error::Error::Validation

mod accounts;
mod categories;
mod contacts;
mod counterparties;
mod events;
mod images;
mod locations;
mod reports;
mod session;
mod transactions;

pub use accounts::{AccountUseCases, ADMIN_BALANCE, ADMIN_USERNAME};
pub use categories::CategoryUseCases;
pub use contacts::ContactUseCases;
pub use counterparties::CounterpartyUseCases;
pub use events::EventUseCases;
pub use images::ImageUseCases;
pub use locations::LocationUseCases;
pub use reports::{CategoryExpense, HomeReport, MonthlyExpense, ReportUseCases};
pub use session::SessionUseCases;
pub use transactions::TransactionUseCases;

use crate::db::Database;
use crate::error::{ensure, Result};
use crate::repository::{
    AccountRepository, CategoryRepository, CounterpartyRepository, EventRepository,
    LocationRepository, PayeeRepository, PayeeTransactionRepository, TransactionImageRepository,
    TransactionRepository, UserRepository,
};

/// Every repository over one database
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub accounts: AccountRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub events: EventRepository,
    pub payees: PayeeRepository,
    pub payee_transactions: PayeeTransactionRepository,
    pub lenders: CounterpartyRepository,
    pub borrowers: CounterpartyRepository,
    pub locations: LocationRepository,
    pub images: TransactionImageRepository,
}

impl Repositories {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            accounts: AccountRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            events: EventRepository::new(db.clone()),
            payees: PayeeRepository::new(db.clone()),
            payee_transactions: PayeeTransactionRepository::new(db.clone()),
            lenders: CounterpartyRepository::lenders(db.clone()),
            borrowers: CounterpartyRepository::borrowers(db.clone()),
            locations: LocationRepository::new(db.clone()),
            images: TransactionImageRepository::new(db.clone()),
        }
    }
}

/// Trimmed `value`, or a validation error naming `what` when blank
pub(crate) fn required(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    ensure(!trimmed.is_empty(), &format!("{} cannot be empty", what))?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required("  Bob ", "Name").unwrap(), "Bob");

        let err = required(" \t", "Name").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Name cannot be empty");
    }
}

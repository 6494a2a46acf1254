//! Domain-facing repositories
//!
//! Each repository owns a cloned [`Database`], runs blocking calls on the
//! blocking pool, maps rows to models, and exposes changing reads as
//! [`Snapshots`] streams. Search queries are wrapped in `%...%` here, once;
//! the access layer takes patterns as given.
//!
//! [`Database`]: crate::db::Database
//! [`Snapshots`]: crate::db::Snapshots

mod accounts;
mod categories;
mod events;
mod images;
mod locations;
mod payees;
mod transactions;
mod users;

pub use accounts::AccountRepository;
pub use categories::CategoryRepository;
pub use events::EventRepository;
pub use images::TransactionImageRepository;
pub use locations::LocationRepository;
pub use payees::{CounterpartyRepository, PayeeRepository, PayeeTransactionRepository};
pub use transactions::TransactionRepository;
pub use users::UserRepository;

/// Substring LIKE pattern for a raw search query
///
/// Wildcards in `query` are escaped with a backslash, matching the
/// `ESCAPE` clause on every search statement.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

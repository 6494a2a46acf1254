//! Conversions between persisted rows and domain models
//!
//! Row to model: millisecond timestamps become `DateTime<Utc>` and stored
//! enum text is parsed, falling back to the enum default when unknown.
//! Model to row: the reverse, carrying every field the row has.

use chrono::{DateTime, Utc};

use crate::db::rows::{
    AccountRow, CategoryRow, CounterpartyRow, EventParticipantRow, EventRow,
    EventWithParticipantsRow, LocationRow, PayeeRow, PayeeTransactionRow, TransactionImageRow,
    TransactionRow, TransactionWithDetailsRow, UserRow,
};
use crate::models::{
    Account, Category, Counterparty, Event, EventParticipant, EventWithParticipants, Location,
    Payee, PayeeTransaction, Transaction, TransactionDetails, TransactionImage, User,
};

pub fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

pub fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

// ========== Users & accounts ==========

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            auth_uid: row.auth_uid,
            created_at: from_millis(row.created_at),
            updated_at: from_millis(row.updated_at),
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            auth_uid: user.auth_uid.clone(),
            created_at: to_millis(&user.created_at),
            updated_at: to_millis(&user.updated_at),
        }
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            account_type: row.account_type.parse().unwrap_or_default(),
            balance: row.balance,
            created_at: from_millis(row.created_at),
        }
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            username: account.username.clone(),
            account_type: account.account_type.as_str().to_string(),
            balance: account.balance,
            created_at: to_millis(&account.created_at),
        }
    }
}

// ========== Categories ==========

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            title: row.title,
            icon: row.icon,
            category_type: row.category_type.parse().unwrap_or_default(),
        }
    }
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            title: category.title.clone(),
            icon: category.icon.clone(),
            category_type: category.category_type.as_str().to_string(),
        }
    }
}

// ========== Events ==========

fn event_from_row(row: EventRow, participants: Vec<String>) -> Event {
    Event {
        id: row.id,
        name: row.name,
        start_date: from_millis(row.start_date),
        end_date: row.end_date.map(from_millis),
        participant_count: row.participant_count,
        account_id: row.account_id,
        is_active: row.is_active,
        participants,
    }
}

impl From<EventWithParticipantsRow> for Event {
    fn from(row: EventWithParticipantsRow) -> Self {
        let names = row.participants.into_iter().map(|p| p.name).collect();
        event_from_row(row.event, names)
    }
}

impl From<EventWithParticipantsRow> for EventWithParticipants {
    fn from(row: EventWithParticipantsRow) -> Self {
        let participants: Vec<EventParticipant> =
            row.participants.into_iter().map(Into::into).collect();
        let names = participants.iter().map(|p| p.name.clone()).collect();
        Self {
            event: event_from_row(row.event, names),
            participants,
        }
    }
}

impl From<EventParticipantRow> for EventParticipant {
    fn from(row: EventParticipantRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
        }
    }
}

/// Participant rows get fresh ids and positions in list order
impl From<&Event> for EventWithParticipantsRow {
    fn from(event: &Event) -> Self {
        Self {
            event: EventRow {
                id: event.id,
                name: event.name.clone(),
                start_date: to_millis(&event.start_date),
                end_date: event.end_date.as_ref().map(to_millis),
                participant_count: event.participant_count,
                account_id: event.account_id,
                is_active: event.is_active,
            },
            participants: event
                .participants
                .iter()
                .enumerate()
                .map(|(position, name)| EventParticipantRow {
                    id: 0,
                    event_id: event.id,
                    position: position as i32,
                    name: name.clone(),
                })
                .collect(),
        }
    }
}

// ========== Locations ==========

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            account_id: row.account_id,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

impl From<&Location> for LocationRow {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            account_id: location.account_id,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

// ========== Payees & counterparties ==========

impl From<PayeeRow> for Payee {
    fn from(row: PayeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            account_id: row.account_id,
            payee_type: row.payee_type.parse().unwrap_or_default(),
            is_from_contacts: row.is_from_contacts,
            contact_id: row.contact_id,
            phone_number: row.phone_number,
            email: row.email,
            notes: row.notes,
        }
    }
}

impl From<&Payee> for PayeeRow {
    fn from(payee: &Payee) -> Self {
        Self {
            id: payee.id,
            name: payee.name.clone(),
            account_id: payee.account_id,
            payee_type: payee.payee_type.as_str().to_string(),
            is_from_contacts: payee.is_from_contacts,
            contact_id: payee.contact_id,
            phone_number: payee.phone_number.clone(),
            email: payee.email.clone(),
            notes: payee.notes.clone(),
        }
    }
}

impl From<PayeeTransactionRow> for PayeeTransaction {
    fn from(row: PayeeTransactionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            account_id: row.account_id,
            is_from_contacts: row.is_from_contacts,
            contact_id: row.contact_id,
        }
    }
}

impl From<&PayeeTransaction> for PayeeTransactionRow {
    fn from(entry: &PayeeTransaction) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            account_id: entry.account_id,
            is_from_contacts: entry.is_from_contacts,
            contact_id: entry.contact_id,
        }
    }
}

impl From<CounterpartyRow> for Counterparty {
    fn from(row: CounterpartyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            email: row.email,
            account_id: row.account_id,
            notes: row.notes,
        }
    }
}

impl From<&Counterparty> for CounterpartyRow {
    fn from(party: &Counterparty) -> Self {
        Self {
            id: party.id,
            name: party.name.clone(),
            phone_number: party.phone_number.clone(),
            email: party.email.clone(),
            account_id: party.account_id,
            notes: party.notes.clone(),
        }
    }
}

// ========== Transactions ==========

/// A row plus its linked payee ids
impl From<(TransactionRow, Vec<i64>)> for Transaction {
    fn from((row, payee_ids): (TransactionRow, Vec<i64>)) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            created_at: from_millis(row.created_at),
            description: row.description,
            category_id: row.category_id,
            account_id: row.account_id,
            event_id: row.event_id,
            location_id: row.location_id,
            lender_id: row.lender_id,
            borrower_id: row.borrower_id,
            payee_ids,
        }
    }
}

/// Payee ids are stored separately as join rows
impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            amount: transaction.amount,
            created_at: to_millis(&transaction.created_at),
            description: transaction.description.clone(),
            category_id: transaction.category_id,
            account_id: transaction.account_id,
            event_id: transaction.event_id,
            location_id: transaction.location_id,
            lender_id: transaction.lender_id,
            borrower_id: transaction.borrower_id,
        }
    }
}

impl From<TransactionWithDetailsRow> for TransactionDetails {
    fn from(row: TransactionWithDetailsRow) -> Self {
        let payee_ids = row.payees.iter().map(|p| p.id).collect();
        Self {
            transaction: (row.transaction, payee_ids).into(),
            category: row.category.into(),
            account: row.account.into(),
            event: row.event.map(Into::into),
            location: row.location.map(Into::into),
            lender: row.lender.map(Into::into),
            borrower: row.borrower.map(Into::into),
            payees: row.payees.into_iter().map(Into::into).collect(),
        }
    }
}

// ========== Images ==========

impl From<TransactionImageRow> for TransactionImage {
    fn from(row: TransactionImageRow) -> Self {
        Self {
            id: row.id,
            transaction_id: row.transaction_id,
            file_path: row.file_path,
            file_name: row.file_name,
            mime_type: row.mime_type,
            file_size: row.file_size,
            created_at: from_millis(row.created_at),
        }
    }
}

impl From<&TransactionImage> for TransactionImageRow {
    fn from(image: &TransactionImage) -> Self {
        Self {
            id: image.id,
            transaction_id: image.transaction_id,
            file_path: image.file_path.clone(),
            file_name: image.file_name.clone(),
            mime_type: image.mime_type.clone(),
            file_size: image.file_size,
            created_at: to_millis(&image.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{timestamp_now, AccountType, CategoryType, PayeeType};

    #[test]
    fn test_transaction_round_trip_keeps_references() {
        let transaction = Transaction {
            id: 7,
            amount: 42.5,
            created_at: timestamp_now(),
            description: "Lunch".to_string(),
            category_id: 3,
            account_id: 1,
            event_id: Some(2),
            location_id: None,
            lender_id: Some(9),
            borrower_id: Some(11),
            payee_ids: vec![5, 4],
        };

        let row = TransactionRow::from(&transaction);
        assert_eq!(row.lender_id, Some(9));
        assert_eq!(row.borrower_id, Some(11));

        let back = Transaction::from((row, transaction.payee_ids.clone()));
        assert_eq!(back, transaction);
    }

    #[test]
    fn test_event_round_trip_preserves_participant_order() {
        let event = Event {
            id: 3,
            name: "Trip".to_string(),
            start_date: timestamp_now(),
            end_date: None,
            participant_count: 3,
            account_id: 1,
            is_active: true,
            participants: vec!["Zoe".into(), "Adam".into(), "Mia, Jr.".into()],
        };

        let row = EventWithParticipantsRow::from(&event);
        let positions: Vec<i32> = row.participants.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        assert_eq!(Event::from(row), event);
    }

    #[test]
    fn test_account_round_trip() {
        let account = Account {
            id: 1,
            user_id: 1,
            username: "Wallet".to_string(),
            account_type: AccountType::EWallet,
            balance: 12.25,
            created_at: timestamp_now(),
        };

        let row = AccountRow::from(&account);
        assert_eq!(row.account_type, "e_wallet");
        assert_eq!(Account::from(row), account);
    }

    #[test]
    fn test_unknown_enum_text_falls_back_to_default() {
        let category = Category::from(CategoryRow {
            id: 1,
            parent_id: None,
            title: "Odd".to_string(),
            icon: "x".to_string(),
            category_type: "gift".to_string(),
        });
        assert_eq!(category.category_type, CategoryType::Expense);

        let payee = Payee::from(PayeeRow {
            id: 1,
            name: "Bob".to_string(),
            account_id: 1,
            payee_type: "".to_string(),
            is_from_contacts: false,
            contact_id: None,
            phone_number: None,
            email: None,
            notes: None,
        });
        assert_eq!(payee.payee_type, PayeeType::Payee);
    }

    #[test]
    fn test_millis_conversion() {
        let now = timestamp_now();
        assert_eq!(from_millis(to_millis(&now)), now);
        assert_eq!(from_millis(0).timestamp(), 0);
    }
}

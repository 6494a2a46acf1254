use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::Result;
use crate::models::{
    Counterparty, NewCounterparty, NewPayee, Payee, PayeeTransaction, PayeeType,
};
use crate::repository::CounterpartyRepository;

/// Payees, payee list entries, lenders and borrowers
#[derive(Clone)]
pub struct CounterpartyUseCases {
    repos: Repositories,
}

impl CounterpartyUseCases {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    // ========== Payees ==========

    /// Add a payee, or return the existing one with exactly that name and type
    pub async fn add_payee(&self, account_id: i64, payee: NewPayee) -> Result<Payee> {
        let name = required(&payee.name, "Payee name")?;

        if let Some(existing) = self
            .repos
            .payees
            .get_by_name(account_id, &name, payee.payee_type)
            .await?
        {
            return Ok(existing);
        }

        let mut created = Payee {
            id: 0,
            name,
            account_id,
            payee_type: payee.payee_type,
            is_from_contacts: payee.is_from_contacts,
            contact_id: payee.contact_id,
            phone_number: payee.phone_number,
            email: payee.email,
            notes: payee.notes,
        };
        created.id = self.repos.payees.insert(&created).await?;
        Ok(created)
    }

    pub async fn update_payee(&self, payee: &Payee) -> Result<()> {
        let name = required(&payee.name, "Payee name")?;
        self.repos
            .payees
            .update(&Payee {
                name,
                ..payee.clone()
            })
            .await
    }

    pub async fn delete_payee(&self, id: i64) -> Result<()> {
        self.repos.payees.delete(id).await
    }

    pub async fn get_payee(&self, id: i64) -> Result<Option<Payee>> {
        self.repos.payees.get(id).await
    }

    pub fn get_payees_by_type(&self, account_id: i64, payee_type: PayeeType) -> Snapshots<Vec<Payee>> {
        self.repos.payees.watch_by_type(account_id, payee_type)
    }

    pub fn get_recent_payees_by_type(
        &self,
        account_id: i64,
        payee_type: PayeeType,
    ) -> Snapshots<Vec<Payee>> {
        self.repos.payees.watch_recent_by_type(account_id, payee_type)
    }

    pub fn search_payees_by_type(
        &self,
        account_id: i64,
        query: &str,
        payee_type: PayeeType,
    ) -> Snapshots<Vec<Payee>> {
        self.repos
            .payees
            .watch_search_by_type(account_id, query.trim(), payee_type)
    }

    // ========== Payee list entries ==========

    /// Add a payee list entry, or return the existing one with that exact name
    pub async fn add_payee_transaction(
        &self,
        account_id: i64,
        name: &str,
        contact_id: Option<i64>,
    ) -> Result<PayeeTransaction> {
        let name = required(name, "Payee name")?;

        if let Some(existing) = self
            .repos
            .payee_transactions
            .get_by_name(account_id, &name)
            .await?
        {
            return Ok(existing);
        }

        let mut created = PayeeTransaction {
            id: 0,
            name,
            account_id,
            is_from_contacts: contact_id.is_some(),
            contact_id,
        };
        created.id = self.repos.payee_transactions.insert(&created).await?;
        Ok(created)
    }

    pub async fn update_payee_transaction(&self, entry: &PayeeTransaction) -> Result<()> {
        let name = required(&entry.name, "Payee name")?;
        self.repos
            .payee_transactions
            .update(&PayeeTransaction {
                name,
                ..entry.clone()
            })
            .await
    }

    pub async fn delete_payee_transaction(&self, id: i64) -> Result<()> {
        self.repos.payee_transactions.delete(id).await
    }

    pub fn get_payee_transactions(&self, account_id: i64) -> Snapshots<Vec<PayeeTransaction>> {
        self.repos.payee_transactions.watch_all(account_id)
    }

    pub fn get_recent_payee_transactions(&self, account_id: i64) -> Snapshots<Vec<PayeeTransaction>> {
        self.repos.payee_transactions.watch_recent(account_id)
    }

    pub fn search_payee_transactions(
        &self,
        account_id: i64,
        query: &str,
    ) -> Snapshots<Vec<PayeeTransaction>> {
        self.repos
            .payee_transactions
            .watch_search(account_id, query.trim())
    }

    // ========== Lenders & borrowers ==========

    pub async fn add_lender(&self, account_id: i64, lender: NewCounterparty) -> Result<Counterparty> {
        add_counterparty(&self.repos.lenders, account_id, lender, "Lender name").await
    }

    pub async fn add_borrower(
        &self,
        account_id: i64,
        borrower: NewCounterparty,
    ) -> Result<Counterparty> {
        add_counterparty(&self.repos.borrowers, account_id, borrower, "Borrower name").await
    }

    pub async fn update_lender(&self, lender: &Counterparty) -> Result<()> {
        update_counterparty(&self.repos.lenders, lender, "Lender name").await
    }

    pub async fn update_borrower(&self, borrower: &Counterparty) -> Result<()> {
        update_counterparty(&self.repos.borrowers, borrower, "Borrower name").await
    }

    pub async fn delete_lender(&self, id: i64) -> Result<()> {
        self.repos.lenders.delete(id).await
    }

    pub async fn delete_borrower(&self, id: i64) -> Result<()> {
        self.repos.borrowers.delete(id).await
    }

    pub fn get_lenders(&self, account_id: i64) -> Snapshots<Vec<Counterparty>> {
        self.repos.lenders.watch_all(account_id)
    }

    pub fn get_borrowers(&self, account_id: i64) -> Snapshots<Vec<Counterparty>> {
        self.repos.borrowers.watch_all(account_id)
    }

    pub fn search_lenders(&self, account_id: i64, query: &str) -> Snapshots<Vec<Counterparty>> {
        self.repos.lenders.watch_search(account_id, query.trim())
    }

    pub fn search_borrowers(&self, account_id: i64, query: &str) -> Snapshots<Vec<Counterparty>> {
        self.repos.borrowers.watch_search(account_id, query.trim())
    }
}

/// Insert unless a counterparty with exactly this name exists in the account
async fn add_counterparty(
    repo: &CounterpartyRepository,
    account_id: i64,
    party: NewCounterparty,
    what: &str,
) -> Result<Counterparty> {
    let name = required(&party.name, what)?;

    if let Some(existing) = repo.get_by_name(account_id, &name).await? {
        return Ok(existing);
    }

    let mut created = Counterparty {
        id: 0,
        name,
        phone_number: party.phone_number,
        email: party.email,
        account_id,
        notes: party.notes,
    };
    created.id = repo.insert(&created).await?;
    Ok(created)
}

async fn update_counterparty(
    repo: &CounterpartyRepository,
    party: &Counterparty,
    what: &str,
) -> Result<()> {
    let name = required(&party.name, what)?;
    repo.update(&Counterparty {
        name,
        ..party.clone()
    })
    .await
}

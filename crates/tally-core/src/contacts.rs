//! Device address book access

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PhoneContact;

/// Source of device contacts, injected by the host platform
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn contacts(&self) -> Result<Vec<PhoneContact>>;
}

/// Fixed in-memory contact list
#[derive(Debug, Clone, Default)]
pub struct StaticContacts {
    contacts: Vec<PhoneContact>,
}

impl StaticContacts {
    pub fn new(contacts: Vec<PhoneContact>) -> Self {
        Self { contacts }
    }
}

#[async_trait]
impl ContactSource for StaticContacts {
    async fn contacts(&self) -> Result<Vec<PhoneContact>> {
        Ok(self.contacts.clone())
    }
}

use std::sync::Arc;

use crate::contacts::ContactSource;
use crate::error::Result;
use crate::models::PhoneContact;

#[derive(Clone)]
pub struct ContactUseCases {
    source: Arc<dyn ContactSource>,
}

impl ContactUseCases {
    pub fn new(source: Arc<dyn ContactSource>) -> Self {
        Self { source }
    }

    /// Device contacts sorted by display name
    pub async fn get_all_phone_contacts(&self) -> Result<Vec<PhoneContact>> {
        let mut contacts = self.source.contacts().await?;
        contacts.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        });
        Ok(contacts)
    }
}

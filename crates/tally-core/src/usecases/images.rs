use std::path::{Path, PathBuf};

use tracing::info;

use super::Repositories;
use crate::db::Snapshots;
use crate::error::{ensure, Result};
use crate::models::TransactionImage;
use crate::storage::{ImageStore, TempFileProvider};

#[derive(Clone)]
pub struct ImageUseCases {
    repos: Repositories,
    store: ImageStore,
}

impl ImageUseCases {
    pub fn new(repos: Repositories, store: ImageStore) -> Self {
        Self { repos, store }
    }

    /// A fresh temp file for a capture to write into
    pub async fn create_temp_file(&self) -> Result<PathBuf> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.create_temp_file()).await?
    }

    /// Copy an image into storage; the result is not attached yet
    pub async fn save_image(&self, source: &Path) -> Result<TransactionImage> {
        let (store, source) = (self.store.clone(), source.to_path_buf());
        tokio::task::spawn_blocking(move || store.save_image(&source)).await?
    }

    /// Attach saved images to a transaction, returning the row ids
    pub async fn attach_images(
        &self,
        transaction_id: i64,
        images: &[TransactionImage],
    ) -> Result<Vec<i64>> {
        ensure(transaction_id > 0, "Images must be attached to a saved transaction")?;
        for image in images {
            self.store.check_stored(image)?;
        }

        let attached: Vec<TransactionImage> = images
            .iter()
            .map(|image| TransactionImage {
                transaction_id,
                ..image.clone()
            })
            .collect();

        let ids = self.repos.images.insert_all(&attached).await?;
        info!(transaction_id, count = ids.len(), "Attached images");
        Ok(ids)
    }

    pub async fn get_images(&self, transaction_id: i64) -> Result<Vec<TransactionImage>> {
        self.repos.images.list(transaction_id).await
    }

    pub fn watch_images(&self, transaction_id: i64) -> Snapshots<Vec<TransactionImage>> {
        self.repos.images.watch_for_transaction(transaction_id)
    }

    /// Delete one image, file first
    pub async fn delete_image(&self, image: &TransactionImage) -> Result<()> {
        let (store, file) = (self.store.clone(), image.clone());
        tokio::task::spawn_blocking(move || store.delete_image(&file)).await??;
        self.repos.images.delete(image.id).await
    }

    /// Delete every image of a transaction, files first; returns rows removed
    pub async fn delete_images(&self, transaction_id: i64) -> Result<usize> {
        let images = self.repos.images.list(transaction_id).await?;
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.delete_images(&images)).await??;
        self.repos.images.delete_for_transaction(transaction_id).await
    }
}

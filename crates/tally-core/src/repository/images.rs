use crate::db::rows::TransactionImageRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::models::TransactionImage;

fn images(rows: Vec<TransactionImageRow>) -> Vec<TransactionImage> {
    rows.into_iter().map(TransactionImage::from).collect()
}

#[derive(Clone)]
pub struct TransactionImageRepository {
    db: Database,
}

impl TransactionImageRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, image: &TransactionImage) -> Result<i64> {
        let row = TransactionImageRow::from(image);
        self.db.call(move |db| db.insert_image(&row)).await
    }

    /// Insert several rows in one SQL transaction, returning their ids
    pub async fn insert_all(&self, batch: &[TransactionImage]) -> Result<Vec<i64>> {
        let rows: Vec<TransactionImageRow> = batch.iter().map(TransactionImageRow::from).collect();
        self.db.call(move |db| db.insert_images(&rows)).await
    }

    pub async fn list(&self, transaction_id: i64) -> Result<Vec<TransactionImage>> {
        self.db
            .call(move |db| Ok(images(db.list_images(transaction_id)?)))
            .await
    }

    pub fn watch_for_transaction(&self, transaction_id: i64) -> Snapshots<Vec<TransactionImage>> {
        self.db.watch(&[Table::TransactionImages], move |db| {
            Ok(images(db.list_images(transaction_id)?))
        })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_image(id)).await
    }

    pub async fn delete_for_transaction(&self, transaction_id: i64) -> Result<usize> {
        self.db
            .call(move |db| db.delete_images_for_transaction(transaction_id))
            .await
    }
}

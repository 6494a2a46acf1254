//! Image attachment commands

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tally_core::Tally;

use super::print_json;

pub async fn cmd_images_attach(app: &Tally, transaction_id: i64, files: &[PathBuf]) -> Result<()> {
    if app.transactions.get_transaction(transaction_id).await?.is_none() {
        bail!("No transaction with id {}", transaction_id);
    }

    let mut saved = Vec::with_capacity(files.len());
    for file in files {
        let image = app
            .attachments
            .save_image(file)
            .await
            .with_context(|| format!("Failed to store {}", file.display()))?;
        saved.push(image);
    }

    let ids = app.attachments.attach_images(transaction_id, &saved).await?;
    println!(
        "📎 Attached {} image(s) to transaction {}",
        ids.len(),
        transaction_id
    );
    Ok(())
}

pub async fn cmd_images_list(app: &Tally, transaction_id: i64, json: bool) -> Result<()> {
    let images = app.attachments.get_images(transaction_id).await?;

    if json {
        return print_json(&images);
    }
    if images.is_empty() {
        println!("No images for transaction {}.", transaction_id);
        return Ok(());
    }
    for image in &images {
        println!(
            "   [{}] {} ({} bytes)",
            image.id,
            app.images.resolve(image)?.display(),
            image.file_size
        );
    }
    Ok(())
}

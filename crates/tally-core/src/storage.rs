//! File-backed transaction image storage
//!
//! Captured images land as `temp_<epochmillis>.jpg` in the cache dir. Saving
//! copies one into the images dir under a generated `IMG_...jpg` name and
//! clears the newest temp capture. Database rows are handled separately.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{timestamp_now, TransactionImage};

pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

const TEMP_PREFIX: &str = "temp_";
const IMAGE_EXTENSION: &str = "jpg";

/// Something that hands out fresh temporary files for a capture to write into
pub trait TempFileProvider: Send + Sync {
    fn create_temp_file(&self) -> Result<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    /// Root that stored `file_path`s are relative to
    data_dir: PathBuf,
    /// Images subfolder name under `data_dir`
    images_dir: String,
    cache_dir: PathBuf,
}

impl ImageStore {
    pub fn new(data_dir: impl Into<PathBuf>, images_dir: &str, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            images_dir: images_dir.to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir, &config.images_dir, &config.cache_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.data_dir.join(&self.images_dir)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_dir
    }

    /// Absolute location of a stored image
    ///
    /// Fails for paths that could leave `data_dir`.
    pub fn resolve(&self, image: &TransactionImage) -> Result<PathBuf> {
        let relative = Path::new(&image.file_path);
        let contained = !image.file_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(Error::InvalidData(format!(
                "Image path outside data dir: {}",
                image.file_path
            )));
        }
        Ok(self.data_dir.join(relative))
    }

    /// Check that an image names a file directly inside the images dir
    pub fn check_stored(&self, image: &TransactionImage) -> Result<()> {
        let plain_name = matches!(
            Path::new(&image.file_name).components().collect::<Vec<_>>().as_slice(),
            [Component::Normal(_)]
        );
        if !plain_name || image.file_path != format!("{}/{}", self.images_dir, image.file_name) {
            return Err(Error::Validation(format!(
                "Image is not in {}: {}",
                self.images_dir, image.file_path
            )));
        }
        Ok(())
    }

    /// Create an empty `temp_<epochmillis>.jpg` in the cache dir
    pub fn create_temp_image_file(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(format!(
            "{}{}.{}",
            TEMP_PREFIX,
            Utc::now().timestamp_millis(),
            IMAGE_EXTENSION
        ));
        File::create(&path)?;
        debug!(path = %path.display(), "Created temp image file");
        Ok(path)
    }

    /// Copy `source` into the images dir and describe the result
    ///
    /// The returned image is not attached to any transaction yet
    /// (`id` and `transaction_id` are 0).
    pub fn save_image(&self, source: &Path) -> Result<TransactionImage> {
        if !source.is_file() {
            return Err(Error::InvalidData(format!(
                "Image source not found: {}",
                source.display()
            )));
        }

        let images_path = self.images_path();
        fs::create_dir_all(&images_path)?;

        let file_name = generate_image_name();
        let dest = images_path.join(&file_name);
        let file_size = fs::copy(source, &dest)?;

        info!(file = %file_name, bytes = file_size, "Saved transaction image");

        if let Err(e) = self.cleanup_latest_temp_file() {
            warn!("Failed to clean up temp image: {}", e);
        }

        Ok(TransactionImage {
            id: 0,
            transaction_id: 0,
            file_path: format!("{}/{}", self.images_dir, file_name),
            file_name,
            mime_type: IMAGE_MIME_TYPE.to_string(),
            file_size: file_size as i64,
            created_at: timestamp_now(),
        })
    }

    /// Remove an image file; returns whether a file was there
    pub fn delete_image(&self, image: &TransactionImage) -> Result<bool> {
        let path = self.resolve(image)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!(file = %image.file_name, "Deleted transaction image");
        Ok(true)
    }

    /// Remove several image files, returning how many existed
    pub fn delete_images(&self, images: &[TransactionImage]) -> Result<usize> {
        let mut deleted = 0;
        for image in images {
            if self.delete_image(image)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Delete the most recently modified `temp_*.jpg` in the cache dir
    fn cleanup_latest_temp_file(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            return Ok(());
        }

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(TEMP_PREFIX) || !name.ends_with(".jpg") {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if newest.as_ref().map_or(true, |(at, _)| modified >= *at) {
                newest = Some((modified, entry.path()));
            }
        }

        if let Some((_, path)) = newest {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "Removed temp image file");
        }
        Ok(())
    }
}

impl TempFileProvider for ImageStore {
    fn create_temp_file(&self) -> Result<PathBuf> {
        self.create_temp_image_file()
    }
}

/// `IMG_<yyyyMMdd_HHmmss>_<8 hex>.jpg`
fn generate_image_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "IMG_{}_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8],
        IMAGE_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> ImageStore {
        ImageStore::new(root, "transaction_images", root.join("cache"))
    }

    #[test]
    fn test_image_name_format() {
        let name = generate_image_name();
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".jpg"));

        // IMG_ + yyyyMMdd_HHmmss + _ + 8 hex + .jpg
        assert_eq!(name.len(), 4 + 15 + 1 + 8 + 4);
        let hex = &name[20..28];
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_temp_file_lives_in_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let temp = store.create_temp_file().unwrap();
        assert!(temp.exists());
        assert_eq!(temp.parent().unwrap(), dir.path().join("cache"));
        let name = temp.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("temp_") && name.ends_with(".jpg"));
    }

    #[test]
    fn test_save_copies_and_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let temp = store.create_temp_image_file().unwrap();
        fs::write(&temp, b"jpeg bytes").unwrap();

        let image = store.save_image(&temp).unwrap();
        assert_eq!(image.id, 0);
        assert_eq!(image.transaction_id, 0);
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.file_size, 10);
        assert_eq!(
            image.file_path,
            format!("transaction_images/{}", image.file_name)
        );
        assert_eq!(fs::read(store.resolve(&image).unwrap()).unwrap(), b"jpeg bytes");
        assert!(store.check_stored(&image).is_ok());
        assert!(!temp.exists());
    }

    #[test]
    fn test_save_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.save_image(&dir.path().join("none.jpg")).is_err());
    }

    #[test]
    fn test_delete_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let source = dir.path().join("photo.jpg");
        fs::write(&source, b"x").unwrap();

        let a = store.save_image(&source).unwrap();
        let b = store.save_image(&source).unwrap();
        assert!(store.delete_image(&a).unwrap());
        assert!(!store.delete_image(&a).unwrap());
        assert_eq!(store.delete_images(&[a, b.clone()]).unwrap(), 1);
        assert!(!store.resolve(&b).unwrap().exists());
    }

    #[test]
    fn test_paths_outside_data_dir_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let source = dir.path().join("photo.jpg");
        fs::write(&source, b"x").unwrap();
        let saved = store.save_image(&source).unwrap();

        let victim = outside.path().join("victim.jpg");
        fs::write(&victim, b"keep me").unwrap();

        let absolute = TransactionImage {
            file_path: victim.to_string_lossy().to_string(),
            ..saved.clone()
        };
        let parent = TransactionImage {
            file_path: "transaction_images/../../victim.jpg".to_string(),
            ..saved.clone()
        };
        let renamed = TransactionImage {
            file_name: "../victim.jpg".to_string(),
            file_path: "transaction_images/../victim.jpg".to_string(),
            ..saved.clone()
        };

        assert!(store.resolve(&absolute).is_err());
        assert!(store.resolve(&parent).is_err());
        assert!(store.delete_image(&absolute).is_err());
        assert!(store.delete_images(&[parent.clone()]).is_err());
        assert!(victim.exists());

        assert!(store.check_stored(&absolute).unwrap_err().is_validation());
        assert!(store.check_stored(&parent).is_err());
        assert!(store.check_stored(&renamed).is_err());
    }
}

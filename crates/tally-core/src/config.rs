//! Application configuration
//!
//! Loaded from an optional TOML file, then `TALLY_DATA_DIR`, on top of
//! built-in defaults. Every key is optional:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/tally"
//! database_file = "tally.db"
//! images_dir = "transaction_images"
//! cache_dir = "/tmp/tally-cache"
//! session_file = "user_session_prefs.json"
//! pool_size = 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::db::DEFAULT_POOL_SIZE;
use crate::error::{Error, Result};

/// Environment variable that overrides `data_dir`
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Subfolder of the data dir holding saved transaction images
pub const IMAGES_SUBDIR: &str = "transaction_images";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub images_dir: String,
    pub cache_dir: PathBuf,
    pub session_file: String,
    pub pool_size: u32,
}

/// Raw TOML shape, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    data_dir: Option<PathBuf>,
    database_file: Option<String>,
    images_dir: Option<String>,
    cache_dir: Option<PathBuf>,
    session_file: Option<String>,
    pool_size: Option<u32>,
}

/// Default data directory (`<data_local_dir>/tally`, or `./tally-data`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tally"))
        .unwrap_or_else(|| PathBuf::from("tally-data"))
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config.toml"))
}

impl Config {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            cache_dir: data_dir.join("cache"),
            data_dir,
            database_file: "tally.db".to_string(),
            images_dir: IMAGES_SUBDIR.to_string(),
            session_file: "user_session_prefs.json".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Load configuration (explicit file first, then the default location)
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?),
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    Some(fs::read_to_string(&default_path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", default_path.display(), e))
                    })?)
                }
                _ => None,
            },
        };

        let mut config = match content {
            Some(content) => Self::parse(&content)?,
            None => Self::default(),
        };

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                debug!(dir = %dir, "Data dir overridden from environment");
                config = config.rebase(PathBuf::from(dir));
            }
        }

        Ok(config)
    }

    /// Parse TOML content over the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = match raw.data_dir {
            Some(dir) => Self::with_data_dir(dir),
            None => Self::default(),
        };

        if let Some(file) = raw.database_file {
            config.database_file = file;
        }
        if let Some(dir) = raw.images_dir {
            config.images_dir = dir;
        }
        if let Some(dir) = raw.cache_dir {
            config.cache_dir = dir;
        }
        if let Some(file) = raw.session_file {
            config.session_file = file;
        }
        if let Some(size) = raw.pool_size {
            if size == 0 {
                return Err(Error::Config("pool_size must be at least 1".to_string()));
            }
            config.pool_size = size;
        }

        Ok(config)
    }

    /// Move the data dir, keeping a cache dir that was set explicitly
    pub fn rebase(mut self, data_dir: PathBuf) -> Self {
        if self.cache_dir == self.data_dir.join("cache") {
            self.cache_dir = data_dir.join("cache");
        }
        self.data_dir = data_dir;
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn images_path(&self) -> PathBuf {
        self.data_dir.join(&self.images_dir)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(&self.session_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_file, "tally.db");
        assert_eq!(config.images_dir, "transaction_images");
        assert_eq!(config.pool_size, 10);
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
            data_dir = "/srv/tally"
            database_file = "ledger.db"
            pool_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/tally"));
        assert_eq!(config.database_path(), PathBuf::from("/srv/tally/ledger.db"));
        assert_eq!(config.cache_dir, PathBuf::from("/srv/tally/cache"));
        assert_eq!(
            config.images_path(),
            PathBuf::from("/srv/tally/transaction_images")
        );
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Config::parse("pool_size = 0").is_err());
        assert!(Config::parse("colour = \"blue\"").is_err());
        assert!(Config::parse("pool_size = ").is_err());
    }

    #[test]
    fn test_rebase_moves_derived_cache_only() {
        let config = Config::with_data_dir("/a").rebase(PathBuf::from("/b"));
        assert_eq!(config.cache_dir, PathBuf::from("/b/cache"));

        let mut custom = Config::with_data_dir("/a");
        custom.cache_dir = PathBuf::from("/tmp/c");
        let custom = custom.rebase(PathBuf::from("/b"));
        assert_eq!(custom.cache_dir, PathBuf::from("/tmp/c"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

//! Cache manager for persisting named JSON slots to disk
//!
//! Provides a `CacheManager` that stores one serializable value per key as a
//! JSON file. Writes replace the whole file atomically so a reader never sees
//! a half-written value.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a persisted slot
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem access failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value could not be (de)serialized
    #[error("Cached value is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No cache location is available on this machine
    #[error("No cache directory available")]
    Unavailable,
}

/// Manages reading and writing cached values to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/farmlog/` on Linux). Each key holds exactly one value, and every
/// write is a whole-value replace.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `PersistenceError::Unavailable` if the cache directory cannot be
    /// determined (e.g., no home directory).
    pub fn new() -> Result<Self, PersistenceError> {
        let project_dirs =
            ProjectDirs::from("", "", "farmlog").ok_or(PersistenceError::Unavailable)?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Ok(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory backing this manager
    pub fn dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a value to the slot named `key`, replacing any previous value
    ///
    /// The value is written to a sibling temp file first and then renamed over
    /// the slot file.
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), PersistenceError> {
        self.ensure_dir()?;

        let json = serde_json::to_string_pretty(data)?;
        let path = self.cache_path(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Reads the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(T))` if the slot exists and parses
    /// * `Ok(None)` if the slot has never been written
    /// * `Err(PersistenceError)` if the file cannot be read or is corrupt
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let content = match fs::read_to_string(self.cache_path(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }
}

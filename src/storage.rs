//! Persistent key-value storage module
//!
//! This module provides a small string key-value store. The file-backed
//! implementation keeps one JSON file per key in the system's standard data
//! directory and rewrites it atomically on every write.

use crate::temp::write_temp_file;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to determine data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access storage directory
    #[error("Failed to create storage directory at {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read a stored value
    #[error("Failed to read storage file {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a stored value
    #[error("Failed to write storage file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to serialize a value for storing
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A string key-value store
pub trait KeyValueStorage {
    /// Reads the value stored under `key`, None if nothing was stored yet
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed storage, one `<key>.json` file per key
#[derive(Debug)]
pub struct FileStorage {
    /// The directory holding the stored files
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage in the system's standard data directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use show_scout::FileStorage;
    ///
    /// let storage = FileStorage::open_default().unwrap();
    /// println!("Storing data in {}", storage.dir().display());
    /// ```
    pub fn open_default() -> Result<Self, StorageError> {
        let proj_dirs = directories::ProjectDirs::from("dev", "showscout", "show_scout")
            .ok_or(StorageError::DataDirectoryNotFound)?;

        Self::open(proj_dirs.data_dir())
    }

    /// Opens storage in `dir`, creating the directory if it doesn't exist
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        Ok(Self { dir })
    }

    /// Returns the path to the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.file_path(key);

        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                path: file_path,
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key);
        let write_failed = |source| StorageError::WriteFailed {
            path: file_path.clone(),
            source,
        };

        let temp = write_temp_file(&self.dir, &sanitize_name(key), value.as_bytes())
            .map_err(write_failed)?;
        temp.persist(&file_path).map_err(write_failed)?;

        Ok(())
    }
}

/// In-memory storage that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage whose every read and write fails
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl KeyValueStorage for FailingStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::ReadFailed {
            path: PathBuf::from(format!("{}.json", key)),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read denied"),
        })
    }

    fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed {
            path: PathBuf::from(format!("{}.json", key)),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        })
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// Sanitizes a key for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Simple"), "simple");
        assert_eq!(sanitize_name("With Spaces"), "with_spaces");
        assert_eq!(sanitize_name("With-Hyphens"), "with-hyphens");
        assert_eq!(sanitize_name("../escape"), "___escape");
    }

    #[test]
    fn test_file_storage_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.read("favorites").unwrap(), None);
    }

    #[test]
    fn test_file_storage_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.write("favorites", "[1]").unwrap();
        storage.write("favorites", "[1,2]").unwrap();

        assert_eq!(storage.read("favorites").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("favorites.json").is_file());

        // No temporary files are left behind
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(storage.dir(), nested.as_path());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("key").unwrap(), None);

        storage.write("key", "value").unwrap();
        assert_eq!(storage.read("key").unwrap().as_deref(), Some("value"));
    }
}

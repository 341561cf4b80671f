//! Temporary file management module
//!
//! This module provides RAII-based temporary file handling with automatic
//! cleanup. Storage writes go through a temporary sibling file which is then
//! renamed over the target.

use std::fs::{self, File};
use std::io::{self, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Guard for a temporary file that is deleted on drop unless it was persisted
#[derive(Debug)]
pub(crate) struct TempGuard {
    path: PathBuf,
    persisted: bool,
}

impl TempGuard {
    /// Get the path to the temporary file
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically moves the temporary file to `target`
    ///
    /// After a successful rename the guard no longer owns a file.
    pub(crate) fn persist(mut self, target: &Path) -> io::Result<()> {
        fs::rename(&self.path, target)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if !self.persisted {
            // Silently ignore errors during cleanup
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl Deref for TempGuard {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.path()
    }
}

/// Writes `contents` to a new temporary file inside `dir`
///
/// The file name is `<prefix>_<ULID>.tmp`, the ULID keeping concurrent writers
/// apart. Keeping the file in the target directory makes the later rename a
/// same-filesystem operation.
///
/// # Examples
///
/// ```ignore
/// let temp = write_temp_file(dir, "favorites", json.as_bytes())?;
/// temp.persist(&dir.join("favorites.json"))?;
/// ```
pub(crate) fn write_temp_file(dir: &Path, prefix: &str, contents: &[u8]) -> io::Result<TempGuard> {
    let ulid = ulid::Ulid::new();
    let path = dir.join(format!("{}_{}.tmp", prefix, ulid));

    let guard = TempGuard {
        path,
        persisted: false,
    };

    let mut file = File::create(guard.path())?;
    file.write_all(contents)?;
    file.sync_all()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = write_temp_file(dir.path(), "test", b"hello").unwrap();
        let path = temp.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        let filename = path.file_name().unwrap().to_str().unwrap();
        assert!(filename.starts_with("test_"));
        assert!(filename.ends_with(".tmp"));

        drop(temp);

        // File should be cleaned up
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.json");
        fs::write(&target, "old").unwrap();

        let temp = write_temp_file(dir.path(), "target", b"new").unwrap();
        let temp_path = temp.path().to_path_buf();
        temp.persist(&target).unwrap();

        assert!(!temp_path.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_multiple_temp_files_unique() {
        let dir = tempfile::tempdir().unwrap();
        let temp1 = write_temp_file(dir.path(), "test", b"a").unwrap();
        let temp2 = write_temp_file(dir.path(), "test", b"b").unwrap();

        assert_ne!(temp1.path(), temp2.path());
        assert!(temp1.exists());
        assert!(temp2.exists());
    }
}

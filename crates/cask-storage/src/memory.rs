//! In-memory backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::StorageBackend;
use crate::error::{Result, StorageError};
use crate::space::StorageSpace;

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    read_only: bool,
    writes: usize,
}

impl MemoryState {
    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() || parent.parent().is_none() => true,
            Some(parent) => self.directories.contains(parent),
        }
    }

    fn has_children(&self, path: &Path) -> bool {
        self.files.keys().any(|p| p.starts_with(path))
            || self
                .directories
                .iter()
                .any(|d| d != path && d.starts_with(path))
    }
}

/// Keeps files and directories in process memory.
///
/// Behaves like a small file system: writing a file requires its parent
/// directory to exist, and each storage space resolves to `/<space-name>`
/// unless overridden.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    overrides: HashMap<StorageSpace, PathBuf>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a storage space to an explicit base directory.
    #[must_use]
    pub fn with_base_directory(mut self, space: StorageSpace, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(space, path.into());
        self
    }

    /// Reject every mutation with a permission error while `read_only` is set.
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    /// Number of successful file writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// All stored file paths, in sorted order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(state: &MemoryState, operation: &'static str, path: &Path) -> Result<()> {
        if state.read_only {
            return Err(StorageError::Io {
                operation,
                path: path.to_path_buf(),
                source: std::io::Error::from(ErrorKind::PermissionDenied),
            });
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn create_directory(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::check_writable(&state, "create directory", path)?;
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                continue;
            }
            state.directories.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.lock().directories.contains(path)
    }

    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()> {
        let mut state = self.lock();
        if !state.directories.contains(path) {
            return Ok(());
        }
        Self::check_writable(&state, "delete directory", path)?;

        if state.has_children(path) {
            if !recursive {
                return Err(StorageError::Io {
                    operation: "delete directory",
                    path: path.to_path_buf(),
                    source: std::io::Error::from(ErrorKind::DirectoryNotEmpty),
                });
            }
            state.files.retain(|p, _| !p.starts_with(path));
            state.directories.retain(|d| !d.starts_with(path));
        } else {
            state.directories.remove(path);
        }
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut state = self.lock();
        Self::check_writable(&state, "write", path)?;
        if !state.parent_exists(path) {
            return Err(StorageError::Io {
                operation: "write",
                path: path.to_path_buf(),
                source: std::io::Error::from(ErrorKind::NotFound),
            });
        }
        state.files.insert(path.to_path_buf(), data.to_vec());
        state.writes += 1;
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        if !state.files.contains_key(path) {
            return Ok(());
        }
        Self::check_writable(&state, "delete", path)?;
        state.files.remove(path);
        Ok(())
    }

    fn resolve_base_directory(&self, space: StorageSpace) -> Result<PathBuf> {
        Ok(self
            .overrides
            .get(&space)
            .cloned()
            .unwrap_or_else(|| Path::new("/").join(space.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_parent_directory() {
        let storage = MemoryStorage::new();
        let path = Path::new("/app/settings.json");

        assert!(storage.write_all_bytes(path, b"{}").is_err());

        storage.create_directory(Path::new("/app")).unwrap();
        storage.write_all_bytes(path, b"{}").unwrap();
        assert_eq!(storage.read_all_bytes(path).unwrap(), b"{}");
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_create_directory_creates_ancestors() {
        let storage = MemoryStorage::new();
        storage.create_directory(Path::new("/a/b/c")).unwrap();

        assert!(storage.directory_exists(Path::new("/a")));
        assert!(storage.directory_exists(Path::new("/a/b")));
        assert!(storage.directory_exists(Path::new("/a/b/c")));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage.read_all_bytes(Path::new("/nothing.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_recursive_directory_delete() {
        let storage = MemoryStorage::new();
        storage.create_directory(Path::new("/app/nested")).unwrap();
        storage
            .write_all_bytes(Path::new("/app/nested/settings.json"), b"{}")
            .unwrap();

        let err = storage.delete_directory(Path::new("/app"), false).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));

        storage.delete_directory(Path::new("/app"), true).unwrap();
        assert!(!storage.directory_exists(Path::new("/app")));
        assert!(storage.files().is_empty());

        // Absent directory is a no-op
        storage.delete_directory(Path::new("/app"), true).unwrap();
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let storage = MemoryStorage::new();
        storage.create_directory(Path::new("/app")).unwrap();
        storage.set_read_only(true);

        let err = storage
            .write_all_bytes(Path::new("/app/settings.json"), b"{}")
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { operation: "write", .. }));
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_base_directories() {
        let storage =
            MemoryStorage::new().with_base_directory(StorageSpace::Instance, "/work");

        assert_eq!(
            storage
                .resolve_base_directory(StorageSpace::SyncedUserDomain)
                .unwrap(),
            Path::new("/synced-user-domain")
        );
        assert_eq!(
            storage.resolve_base_directory(StorageSpace::Instance).unwrap(),
            Path::new("/work")
        );
    }
}

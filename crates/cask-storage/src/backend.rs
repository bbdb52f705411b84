//! The storage abstraction consumed by settings containers.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::space::StorageSpace;

/// Read/write/exists/delete of named byte blobs at resolved paths.
///
/// Implementations must be usable from a shared reference; containers hold
/// backends behind an `Arc` so several containers can share one store.
///
/// `delete_file` and `delete_directory` are no-ops when the target is absent.
/// `read_all_bytes` reports a missing file as [`StorageError::NotFound`].
///
/// [`StorageError::NotFound`]: crate::StorageError::NotFound
pub trait StorageBackend: Send + Sync {
    /// Create a directory and all of its missing parents.
    fn create_directory(&self, path: &Path) -> Result<()>;

    /// Check whether a directory exists.
    fn directory_exists(&self, path: &Path) -> bool;

    /// Delete a directory if it exists.
    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()>;

    /// Check whether a file exists.
    fn file_exists(&self, path: &Path) -> bool;

    /// Read the whole content of a file.
    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the content of a file with `data`.
    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file if it exists.
    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Get the base directory for a storage space.
    fn resolve_base_directory(&self, space: StorageSpace) -> Result<PathBuf>;
}

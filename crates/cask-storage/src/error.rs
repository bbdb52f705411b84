//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::space::StorageSpace;

/// Storage operation error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file or one of its parent directories does not exist.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Any other I/O failure (permission denied, disk full, ...).
    #[error("Failed to {operation}: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete write operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The base directory of a storage space could not be determined.
    #[error("Could not resolve a directory for storage space {space}")]
    UnresolvedLocation { space: StorageSpace },
}

impl StorageError {
    /// Build an error from an I/O failure, mapping `NotFound` to its own variant.
    pub fn from_io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io {
                operation,
                path,
                source,
            }
        }
    }

    /// Whether this error means the target simply does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => {
                format!("Nothing is stored at {}", path.display())
            }
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::UnresolvedLocation { space } => {
                format!("The {space} storage location is not available on this system.")
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => None,
            Self::Io { operation, .. } => {
                if operation.starts_with("read") {
                    Some("Check that you have permission to read this location.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or choose a different storage location.".into())
            }
            Self::UnresolvedLocation { .. } => {
                Some("Use the instance storage space or an explicit file path.".into())
            }
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

//! Local file system backend.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::backend::StorageBackend;
use crate::error::{Result, StorageError};
use crate::space::StorageSpace;

/// Stores settings files on the local file system.
///
/// Writes are atomic: data goes to a sibling temp file which is synced and then
/// renamed over the target, so readers see either the old or the new content.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    overrides: HashMap<StorageSpace, PathBuf>,
}

impl LocalFileSystem {
    /// Create a backend that resolves storage spaces to the platform defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a storage space to an explicit base directory.
    #[must_use]
    pub fn with_base_directory(mut self, space: StorageSpace, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(space, path.into());
        self
    }

    /// Pin every storage space to a sub directory of `root` named after the space.
    #[must_use]
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let overrides = StorageSpace::all()
            .iter()
            .map(|&space| (space, root.join(space.as_str())))
            .collect();
        Self { overrides }
    }

    fn platform_directory(space: StorageSpace) -> Option<PathBuf> {
        match space {
            StorageSpace::SyncedUserDomain => {
                BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
            }
            StorageSpace::UserDomain => {
                BaseDirs::new().map(|dirs| dirs.data_local_dir().to_path_buf())
            }
            StorageSpace::MachineDomain => machine_directory(),
            StorageSpace::Instance => std::env::current_dir().ok(),
        }
    }
}

#[cfg(windows)]
fn machine_directory() -> Option<PathBuf> {
    std::env::var_os("PROGRAMDATA")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from(r"C:\ProgramData")))
}

#[cfg(target_os = "macos")]
fn machine_directory() -> Option<PathBuf> {
    Some(PathBuf::from("/Library/Application Support"))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn machine_directory() -> Option<PathBuf> {
    Some(PathBuf::from("/var/lib"))
}

/// Temp file used while writing `path`, next to it so the rename stays on one volume.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Fill `temp_path` with `fill`, then rename it over `target`.
///
/// The temp file is removed on every failure path.
fn write_through_temp(
    temp_path: &Path,
    target: &Path,
    fill: impl FnOnce(&mut File) -> Result<()>,
) -> Result<()> {
    let mut file = File::create(temp_path).map_err(|e| StorageError::Io {
        operation: "create",
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    if let Err(e) = fill(&mut file) {
        drop(file);
        let _ = fs::remove_file(temp_path);
        return Err(e);
    }
    drop(file);

    // Atomic rename
    if let Err(e) = fs::rename(temp_path, target) {
        let _ = fs::remove_file(temp_path);
        return Err(StorageError::AtomicWriteFailed {
            temp_path: temp_path.to_path_buf(),
            target_path: target.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

impl StorageBackend for LocalFileSystem {
    fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| StorageError::Io {
            operation: "create directory",
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()> {
        let outcome = if recursive {
            fs::remove_dir_all(path)
        } else {
            fs::remove_dir(path)
        };

        match outcome {
            Ok(()) => {
                tracing::debug!("Deleted directory {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io {
                operation: "delete directory",
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| StorageError::from_io("read", path, e))
    }

    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        let temp_path = temp_path_for(path);

        write_through_temp(&temp_path, path, |file| {
            file.write_all(data).map_err(|e| StorageError::Io {
                operation: "write",
                path: temp_path.clone(),
                source: e,
            })?;
            file.sync_all().map_err(|e| StorageError::Io {
                operation: "sync",
                path: temp_path.clone(),
                source: e,
            })
        })?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io {
                operation: "delete",
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn resolve_base_directory(&self, space: StorageSpace) -> Result<PathBuf> {
        if let Some(path) = self.overrides.get(&space) {
            return Ok(path.clone());
        }
        Self::platform_directory(space).ok_or(StorageError::UnresolvedLocation { space })
    }
}

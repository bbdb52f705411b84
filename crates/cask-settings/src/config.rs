//! Storage configuration of a settings container.
//!
//! The configuration says where the settings file lives. It belongs to the
//! container, not to the settings type, and is never written to the document.
//!
//! ```toml
//! storage_space = "user-domain"
//! sub_directory = "MyApp"
//! file_name = "Settings.json"
//! ```

use std::path::{Path, PathBuf};

use cask_storage::{StorageBackend, StorageSpace};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

const DEFAULT_FILE_NAME: &str = "Settings.json";

/// Where a container's settings file is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Abstract base location.
    pub storage_space: StorageSpace,
    /// Path below the storage space's base directory. An absolute path replaces it.
    pub sub_directory: PathBuf,
    /// Name of the settings file.
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_space: StorageSpace::default(),
            sub_directory: PathBuf::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl StorageConfig {
    /// Configuration whose file is named after the settings type (`AppSettings.json`).
    pub fn for_settings<S>() -> Self {
        let full = std::any::type_name::<S>();
        // Drop the module path and any generic arguments
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);
        Self {
            file_name: format!("{short}.json"),
            ..Self::default()
        }
    }

    /// Configuration pinned to an explicit file path.
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            storage_space: StorageSpace::Instance,
            sub_directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| SettingsError::Config { source })
    }

    #[must_use]
    pub fn with_storage_space(mut self, space: StorageSpace) -> Self {
        self.storage_space = space;
        self
    }

    #[must_use]
    pub fn with_sub_directory(mut self, sub_directory: impl Into<PathBuf>) -> Self {
        self.sub_directory = sub_directory.into();
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Whether the configuration names a directory of its own below the base.
    pub fn has_sub_directory(&self) -> bool {
        !self.sub_directory.as_os_str().is_empty()
    }

    /// Full directory path, resolved through `storage`.
    pub fn directory_path(&self, storage: &dyn StorageBackend) -> Result<PathBuf> {
        let base = storage.resolve_base_directory(self.storage_space)?;
        if self.has_sub_directory() {
            Ok(base.join(&self.sub_directory))
        } else {
            Ok(base)
        }
    }

    /// Full file path, resolved through `storage`.
    pub fn file_path(&self, storage: &dyn StorageBackend) -> Result<PathBuf> {
        Ok(self.directory_path(storage)?.join(&self.file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_storage::MemoryStorage;

    struct AppSettings;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.storage_space, StorageSpace::SyncedUserDomain);
        assert_eq!(config.file_name, "Settings.json");
        assert!(!config.has_sub_directory());
    }

    #[test]
    fn test_for_settings_uses_type_name() {
        let config = StorageConfig::for_settings::<AppSettings>();
        assert_eq!(config.file_name, "AppSettings.json");

        let generic = StorageConfig::for_settings::<Vec<AppSettings>>();
        assert_eq!(generic.file_name, "Vec.json");
    }

    #[test]
    fn test_paths_resolve_through_storage() {
        let storage = MemoryStorage::new();
        let config = StorageConfig::default()
            .with_storage_space(StorageSpace::UserDomain)
            .with_sub_directory("MyApp");

        assert_eq!(
            config.file_path(&storage).unwrap(),
            Path::new("/user-domain/MyApp/Settings.json")
        );
    }

    #[test]
    fn test_at_path_overrides_base_directory() {
        let storage = MemoryStorage::new();
        let config = StorageConfig::at_path("/srv/app/settings.json");

        assert_eq!(
            config.file_path(&storage).unwrap(),
            Path::new("/srv/app/settings.json")
        );
    }

    #[test]
    fn test_from_toml() {
        let config = StorageConfig::from_toml_str(
            r#"
            storage_space = "machine-domain"
            sub_directory = "Vendor/App"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_space, StorageSpace::MachineDomain);
        assert_eq!(config.sub_directory, Path::new("Vendor/App"));
        assert_eq!(config.file_name, "Settings.json");
    }

    #[test]
    fn test_from_toml_rejects_unknown_space() {
        let err = StorageConfig::from_toml_str(r#"storage_space = "cloud""#).unwrap_err();
        assert!(matches!(err, SettingsError::Config { .. }));
    }
}

//! Abstract storage locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a settings file lives, independent of the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageSpace {
    /// Per-user data that follows the user across machines (roaming profile).
    #[default]
    SyncedUserDomain,
    /// Per-user data local to this machine.
    UserDomain,
    /// Data shared by every user of this machine.
    MachineDomain,
    /// The directory the process was started from.
    Instance,
}

impl StorageSpace {
    /// Get all storage spaces.
    pub const fn all() -> &'static [StorageSpace] {
        &[
            Self::SyncedUserDomain,
            Self::UserDomain,
            Self::MachineDomain,
            Self::Instance,
        ]
    }

    /// Stable identifier, matching the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SyncedUserDomain => "synced-user-domain",
            Self::UserDomain => "user-domain",
            Self::MachineDomain => "machine-domain",
            Self::Instance => "instance",
        }
    }
}

impl fmt::Display for StorageSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

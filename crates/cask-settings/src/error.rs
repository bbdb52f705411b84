//! Settings error types.
//!
//! Every fallible settings operation returns a [`SettingsError`]. Variants map
//! onto the failure classes callers need to tell apart: a settings type that
//! cannot be set up, storage failures, and per-member encode/decode failures.

use cask_storage::StorageError;
use thiserror::Error;

/// Error raised by a member converter or by the default serde codec.
pub type ConverterError = Box<dyn std::error::Error + Send + Sync>;

/// Settings operation error.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings type could not be instantiated or its member list is invalid.
    #[error("Cannot construct settings of type {type_name}: {reason}")]
    Construction {
        type_name: &'static str,
        reason: String,
    },

    /// The storage backend failed.
    #[error("Storage operation failed")]
    Storage {
        #[from]
        source: StorageError,
    },

    /// A member value could not be encoded.
    #[error("Failed to encode member '{member}'")]
    Encode {
        member: String,
        #[source]
        source: ConverterError,
    },

    /// A document field could not be decoded into its member.
    #[error("Failed to decode member '{member}'")]
    Decode {
        member: String,
        #[source]
        source: ConverterError,
    },

    /// The stored bytes are not a settings document.
    #[error("Invalid settings document: {reason}")]
    InvalidDocument { reason: String },

    /// The encoded document could not be rendered to bytes.
    #[error("Failed to serialize settings document")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// A storage configuration could not be parsed.
    #[error("Invalid storage configuration")]
    Config {
        #[source]
        source: toml::de::Error,
    },
}

impl SettingsError {
    pub(crate) fn construction(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Construction {
            type_name,
            reason: reason.into(),
        }
    }

    /// Prefix the member path of an encode/decode error with its parent section.
    #[must_use]
    pub(crate) fn within(self, parent: &str) -> Self {
        match self {
            Self::Encode { member, source } => Self::Encode {
                member: format!("{parent}.{member}"),
                source,
            },
            Self::Decode { member, source } => Self::Decode {
                member: format!("{parent}.{member}"),
                source,
            },
            other => other,
        }
    }

    /// Dotted path of the member that failed, for encode/decode errors.
    pub fn member(&self) -> Option<&str> {
        match self {
            Self::Encode { member, .. } | Self::Decode { member, .. } => Some(member),
            _ => None,
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Construction { type_name, reason } => {
                format!("The settings type {type_name} cannot be used: {reason}")
            }
            Self::Storage { source } => source.user_message(),
            Self::Encode { member, .. } => {
                format!("The setting '{member}' could not be saved. The file was left unchanged.")
            }
            Self::Decode { member, .. } => {
                format!("The stored value of '{member}' could not be read.")
            }
            Self::InvalidDocument { reason } => {
                format!("The settings file is not valid: {reason}")
            }
            Self::Serialization { .. } => {
                "An error occurred while preparing the settings for saving.".to_string()
            }
            Self::Config { source } => {
                format!("The storage configuration could not be read: {}", source.message())
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Construction { .. } => {
                Some("Check the member declarations of the settings type.".into())
            }
            Self::Storage { source } => source.suggestion(),
            Self::Encode { .. } | Self::Serialization { .. } => None,
            Self::Decode { .. } | Self::InvalidDocument { .. } => Some(
                "Fix or delete the settings file; defaults are used for values that cannot be read."
                    .into(),
            ),
            Self::Config { .. } => Some("Check the storage configuration file for typos.".into()),
        }
    }
}

/// Result type alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

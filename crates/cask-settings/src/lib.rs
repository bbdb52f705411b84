//! Persist settings objects to structured files and repopulate live instances
//! in place.
//!
//! A settings type declares its members once. From that declaration the crate
//! builds a cached [`Schema`] and can then:
//!
//! - **encode** the object into an ordered JSON [`Document`]
//! - **populate** an existing instance from a document without replacing it,
//!   so references held elsewhere keep seeing the same object
//! - **reset** members to the values captured at construction
//! - **track** whether the in-memory state matches what was last saved
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cask_settings::{
//!     Field, MemoryStorage, SchemaBuilder, Settings, SettingsContainer, StorageConfig, field,
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Editor {
//!     font_size: u32,
//!     theme: String,
//! }
//!
//! impl Default for Editor {
//!     fn default() -> Self {
//!         Self { font_size: 13, theme: "dark".into() }
//!     }
//! }
//!
//! impl Editor {
//!     const FONT_SIZE: Field<Editor, u32> = field!(Editor, font_size);
//!     const THEME: Field<Editor, String> = field!(Editor, theme);
//! }
//!
//! impl Settings for Editor {
//!     fn declare(schema: &mut SchemaBuilder<Self>) {
//!         schema.field(Self::FONT_SIZE).field(Self::THEME);
//!     }
//! }
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let config = StorageConfig::default().with_sub_directory("MyEditor");
//!
//! let mut editor = SettingsContainer::<Editor>::with_storage(config.clone(), storage.clone())?;
//! editor.set(Editor::FONT_SIZE, 16);
//! editor.save()?;
//!
//! let mut other = SettingsContainer::<Editor>::with_storage(config, storage)?;
//! assert!(other.load()?);
//! assert_eq!(other.font_size, 16);
//! # Ok::<(), cask_settings::SettingsError>(())
//! ```
//!
//! # Architecture
//!
//! - `member.rs` - typed field handles, converters, member descriptors
//! - `filter.rs` - member attributes (rename, ignore, converter)
//! - `inventory.rs` - schema declaration, validation and per-type cache
//! - `codec/` - document model, encode and in-place populate
//! - `container.rs` - persistence, defaults, dirty state, notifications
//! - `staging.rs` - stable/dirty container pair
//! - `config.rs` - storage location configuration
//!
//! File access lives in the `cask-storage` crate, re-exported here.

mod access;
mod codec;
mod config;
mod container;
mod error;
mod filter;
mod inventory;
mod macros;
mod member;
mod notify;
mod staging;
mod tracker;

// Re-export main types
pub use codec::{Document, PopulateReport, encode, populate};
pub use config::StorageConfig;
pub use container::SettingsContainer;
pub use error::{ConverterError, Result, SettingsError};
pub use filter::{Member, MemberAttributes, Section};
pub use inventory::{Schema, SchemaBuilder, Settings, inventory};
pub use member::{Converter, ConverterSource, Field, FnConverter, MemberDescriptor, MemberKind};
pub use notify::{ChangeEvent, SubscriptionId};
pub use staging::Stager;
pub use tracker::DirtyTracker;

pub use cask_storage::{
    LocalFileSystem, MemoryStorage, StorageBackend, StorageError, StorageSpace,
};

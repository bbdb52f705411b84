//! Storage backends for cask settings files.
//!
//! The settings core never touches the file system directly. Every read, write
//! and delete goes through a [`StorageBackend`], which keeps path resolution and
//! platform-specific locations out of the serialization engine.
//!
//! # Backends
//!
//! - [`LocalFileSystem`] - the real file system, with atomic writes
//!   (temp file + rename) so a crash mid-write never leaves a half-written file
//! - [`MemoryStorage`] - an in-process map of paths to bytes, used by tests and
//!   by hosts that embed settings in another store
//!
//! # Storage spaces
//!
//! A [`StorageSpace`] names an abstract location (roaming user data, local user
//! data, machine-wide data, the current directory). Each backend decides how a
//! space maps onto a concrete base directory.

mod backend;
mod error;
mod local;
mod memory;
mod space;

pub use backend::StorageBackend;
pub use error::{Result, StorageError};
pub use local::LocalFileSystem;
pub use memory::MemoryStorage;
pub use space::StorageSpace;

//! The settings container: a live settings object bound to a storage location.
//!
//! Save, load, reset and copy never replace the held settings value; they
//! mutate its members in place. Every member mutation goes through one choke
//! point that compares values, notifies observers and updates the saved flag.

use std::convert::Infallible;
use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use cask_storage::{LocalFileSystem, StorageBackend};

use crate::codec::{self, Document, PopulateReport};
use crate::config::StorageConfig;
use crate::error::{Result, SettingsError};
use crate::inventory::{Schema, Settings, inventory};
use crate::member::{Field, MemberDescriptor};
use crate::notify::{ChangeEvent, Observers, SubscriptionId};
use crate::tracker::DirtyTracker;

/// A settings value with persistence, defaults and change tracking.
///
/// The container dereferences to the settings value for reads. Writes go
/// through [`set`](Self::set) or [`update`](Self::update).
pub struct SettingsContainer<S: Settings> {
    settings: S,
    defaults: S,
    schema: &'static Schema<S>,
    config: StorageConfig,
    storage: Arc<dyn StorageBackend>,
    tracker: DirtyTracker,
    observers: Observers,
}

impl<S: Settings> SettingsContainer<S> {
    /// Create a container on the local file system, starting from `S::default()`.
    pub fn new(config: StorageConfig) -> Result<Self>
    where
        S: Default,
    {
        Self::with_storage(config, Arc::new(LocalFileSystem::new()))
    }

    /// Create a container on `storage`, starting from `S::default()`.
    pub fn with_storage(config: StorageConfig, storage: Arc<dyn StorageBackend>) -> Result<Self>
    where
        S: Default,
    {
        Self::from_factory(config, storage, || Ok::<_, Infallible>(S::default()))
    }

    /// Create a container whose initial value comes from `factory`.
    ///
    /// The value returned by the factory becomes the default snapshot used by
    /// [`reset`](Self::reset). A factory error is a construction error.
    pub fn from_factory<F, E>(
        config: StorageConfig,
        storage: Arc<dyn StorageBackend>,
        factory: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<S, E>,
        E: fmt::Display,
    {
        let schema = inventory::<S>()?;
        let settings = factory()
            .map_err(|e| SettingsError::construction(schema.type_name(), e.to_string()))?;
        Ok(Self::from_parts(settings, schema, config, storage))
    }

    fn from_parts(
        settings: S,
        schema: &'static Schema<S>,
        config: StorageConfig,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            defaults: settings.clone(),
            settings,
            schema,
            config,
            storage,
            tracker: DirtyTracker::new(),
            observers: Observers::default(),
        }
    }

    /// The current settings value.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// The value captured at construction.
    pub fn defaults(&self) -> &S {
        &self.defaults
    }

    pub fn schema(&self) -> &'static Schema<S> {
        self.schema
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Point the container at another location. The saved flag is not touched.
    pub fn set_config(&mut self, config: StorageConfig) {
        self.config = config;
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    pub fn directory_path(&self) -> Result<PathBuf> {
        self.config.directory_path(self.storage.as_ref())
    }

    pub fn file_path(&self) -> Result<PathBuf> {
        self.config.file_path(self.storage.as_ref())
    }

    /// Whether the in-memory value matches the last save or load.
    pub fn is_saved(&self) -> bool {
        !self.tracker.is_dirty()
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    /// Read one member.
    pub fn get<T>(&self, field: Field<S, T>) -> &T {
        field.get(&self.settings)
    }

    /// Write one member. Returns false, and does nothing, if the value is unchanged.
    ///
    /// A change notifies observers. A change to a persisted member also marks
    /// the container dirty; ignored and undeclared members never do.
    pub fn set<T: PartialEq>(&mut self, field: Field<S, T>, value: T) -> bool {
        let slot = field.get_mut(&mut self.settings);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.record_change(field.name());
        true
    }

    /// Apply an arbitrary mutation, then report every persisted member it changed.
    ///
    /// Returns the number of changed members.
    pub fn update(&mut self, mutate: impl FnOnce(&mut S)) -> usize {
        let before = self.settings.clone();
        mutate(&mut self.settings);

        let changed: Vec<&'static str> = self
            .schema
            .diff(&before, &self.settings)
            .into_iter()
            .map(MemberDescriptor::name)
            .collect();
        for &name in &changed {
            self.record_change(name);
        }
        changed.len()
    }

    /// Persisted members whose value differs from the construction-time defaults.
    pub fn changed_from_defaults(&self) -> Vec<&'static MemberDescriptor> {
        self.schema.diff(&self.defaults, &self.settings)
    }

    /// Register a change handler.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&ChangeEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(Box::new(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Suppress change notifications until called again with `false`.
    pub fn silence_notifications(&mut self, silenced: bool) {
        self.observers.silence(silenced);
    }

    pub fn notifications_silenced(&self) -> bool {
        self.observers.is_silenced()
    }

    /// Encode the current value into a document.
    pub fn encode(&self) -> Result<Document> {
        codec::encode(self.schema, &self.settings)
    }

    /// Apply a document onto the current value, in place.
    ///
    /// Every changed member is reported exactly as a [`set`](Self::set) would
    /// report it, including members applied before a decode failure.
    pub fn populate(&mut self, document: &Document) -> Result<PopulateReport> {
        let schema = self.schema;
        let mut changed = Vec::new();
        let result = codec::populate_members(
            schema,
            &mut self.settings,
            document.fields(),
            &mut |member| changed.push(member.name()),
        );
        for name in changed {
            self.record_change(name);
        }
        result
    }

    /// Write the current value to storage.
    ///
    /// The document is encoded completely before storage is touched, so an
    /// encode failure leaves any existing file as it was.
    pub fn save(&mut self) -> Result<()> {
        let bytes = self.encode()?.to_bytes()?;

        let directory = self.directory_path()?;
        let path = self.file_path()?;
        self.storage.create_directory(&directory)?;
        self.storage.write_all_bytes(&path, &bytes)?;

        self.mark_saved();
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// [`save`](Self::save), logging and swallowing any error.
    pub fn try_save(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    /// Populate the current value from storage.
    ///
    /// Returns `Ok(false)` when there is no settings file. On a decode error
    /// the members before the failing field are already applied.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.file_path()?;
        let bytes = match self.storage.read_all_bytes(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                tracing::debug!("No settings file at {}", path.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let document = Document::from_bytes(&bytes)?;
        let report = self.populate(&document)?;

        self.mark_saved();
        tracing::info!(
            "Loaded settings from {} ({} fields applied, {} skipped)",
            path.display(),
            report.applied,
            report.skipped.len()
        );
        Ok(true)
    }

    /// [`load`](Self::load), logging and swallowing any error.
    ///
    /// Returns true only when a file was found and applied.
    pub fn try_load(&mut self) -> bool {
        match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Failed to load settings: {}", e);
                false
            }
        }
    }

    /// Restore every persisted member to its construction-time value.
    ///
    /// Storage is not read. The container is always left dirty.
    pub fn reset(&mut self) {
        let schema = self.schema;
        let mut changed = Vec::new();
        for member in schema.included() {
            if member.access.assign_from(&mut self.settings, &self.defaults) {
                changed.push(member.descriptor.name());
            }
        }
        for name in changed {
            self.record_change(name);
        }
        self.mark_dirty();
    }

    /// Delete the settings file, or its whole sub directory with `with_directory`.
    ///
    /// Returns whether anything was deleted. The storage space's base directory
    /// is never deleted; without a sub directory only the file goes.
    pub fn delete(&self, with_directory: bool) -> Result<bool> {
        if with_directory && self.config.has_sub_directory() {
            let directory = self.directory_path()?;
            if self.storage.directory_exists(&directory) {
                self.storage.delete_directory(&directory, true)?;
                tracing::info!("Deleted settings directory {}", directory.display());
                return Ok(true);
            }
        }

        let path = self.file_path()?;
        if !self.storage.file_exists(&path) {
            return Ok(false);
        }
        self.storage.delete_file(&path)?;
        tracing::info!("Deleted settings file {}", path.display());
        Ok(true)
    }

    /// [`delete`](Self::delete), logging and swallowing any error.
    pub fn try_delete(&self, with_directory: bool) -> bool {
        match self.delete(with_directory) {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!("Failed to delete settings: {}", e);
                false
            }
        }
    }

    /// Copy every persisted member from `other` and adopt its saved flag.
    ///
    /// Goes through encode and populate, so copying behaves exactly like a
    /// save followed by a load.
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        let document = other.encode()?;
        self.populate(&document)?;
        if other.is_saved() {
            self.mark_saved();
        } else {
            self.mark_dirty();
        }
        Ok(())
    }

    /// A new container with the same defaults, location and storage, holding
    /// a copy of the current value. Observers are not carried over.
    pub fn duplicate(&self) -> Result<Self> {
        let mut copy = Self::from_parts(
            self.defaults.clone(),
            self.schema,
            self.config.clone(),
            Arc::clone(&self.storage),
        );
        copy.copy_from(self)?;
        Ok(copy)
    }

    fn record_change(&mut self, name: &'static str) {
        self.observers.emit(&ChangeEvent::Member { name });
        if self.schema.is_persisted(name) {
            self.mark_dirty();
        }
    }

    fn mark_dirty(&mut self) {
        if self.tracker.mark_dirty() {
            self.observers
                .emit(&ChangeEvent::SavedState { is_saved: false });
        }
    }

    fn mark_saved(&mut self) {
        if self.tracker.mark_saved() {
            self.observers.emit(&ChangeEvent::SavedState { is_saved: true });
        }
    }
}

impl<S: Settings> Deref for SettingsContainer<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.settings
    }
}

impl<S: Settings + fmt::Debug> fmt::Debug for SettingsContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsContainer")
            .field("settings", &self.settings)
            .field("config", &self.config)
            .field("is_saved", &self.is_saved())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

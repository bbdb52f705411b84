//! A stable/dirty pair of containers for edit-then-commit workflows.
//!
//! The application reads the stable container and edits the dirty one. Saving
//! commits the dirty copy to storage and then to the stable copy; reverting
//! throws the edits away.

use crate::container::SettingsContainer;
use crate::error::Result;
use crate::inventory::Settings;

/// Two containers of the same settings type bound to the same location.
pub struct Stager<S: Settings> {
    stable: SettingsContainer<S>,
    dirty: SettingsContainer<S>,
}

impl<S: Settings> Stager<S> {
    pub fn new(stable: SettingsContainer<S>, dirty: SettingsContainer<S>) -> Self {
        Self { stable, dirty }
    }

    /// Build both containers with the same factory.
    pub fn from_factory(mut factory: impl FnMut() -> Result<SettingsContainer<S>>) -> Result<Self> {
        let stable = factory()?;
        let dirty = factory()?;
        Ok(Self::new(stable, dirty))
    }

    /// The committed settings.
    pub fn stable(&self) -> &SettingsContainer<S> {
        &self.stable
    }

    /// The settings being edited.
    pub fn dirty(&self) -> &SettingsContainer<S> {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut SettingsContainer<S> {
        &mut self.dirty
    }

    /// Persist the dirty copy, then copy it onto the stable one.
    ///
    /// If the save fails the stable copy is left alone.
    pub fn save(&mut self) -> Result<()> {
        self.dirty.save()?;
        self.stable.copy_from(&self.dirty)
    }

    pub fn try_save(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save staged settings: {}", e);
                false
            }
        }
    }

    /// Load into the dirty copy, then copy it onto the stable one.
    ///
    /// Returns whether a settings file was found.
    pub fn load(&mut self) -> Result<bool> {
        let loaded = self.dirty.load()?;
        self.stable.copy_from(&self.dirty)?;
        Ok(loaded)
    }

    pub fn try_load(&mut self) -> bool {
        match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Failed to load staged settings: {}", e);
                false
            }
        }
    }

    /// Discard uncommitted edits by copying the stable copy onto the dirty one.
    pub fn revert_staging(&mut self) -> Result<()> {
        self.dirty.copy_from(&self.stable)
    }

    /// Whether any persisted member differs between the two copies.
    pub fn has_staged_changes(&self) -> bool {
        !self
            .stable
            .schema()
            .diff(self.stable.settings(), self.dirty.settings())
            .is_empty()
    }

    pub fn into_parts(self) -> (SettingsContainer<S>, SettingsContainer<S>) {
        (self.stable, self.dirty)
    }
}

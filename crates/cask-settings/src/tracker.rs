//! Saved/dirty state of a settings container.

use std::time::{Duration, Instant};

/// Whether the in-memory settings match what was last saved or loaded.
///
/// Starts clean: before any file exists, the defaults count as saved. The
/// tracker is dirty exactly while `dirty_since` is set.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_since: Option<Instant>,
    last_change: Option<Instant>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Record a change. Returns true on the clean to dirty transition.
    pub fn mark_dirty(&mut self) -> bool {
        let now = Instant::now();
        self.last_change = Some(now);
        if self.dirty_since.is_some() {
            return false;
        }
        self.dirty_since = Some(now);
        true
    }

    /// Record a save or load. Returns true on the dirty to clean transition.
    pub fn mark_saved(&mut self) -> bool {
        self.dirty_since.take().is_some()
    }

    /// Time since the most recent change, saved or not.
    pub fn since_last_change(&self) -> Option<Duration> {
        self.last_change.as_ref().map(Instant::elapsed)
    }

    /// How long the oldest unsaved change has been waiting.
    pub fn unsaved_for(&self) -> Option<Duration> {
        self.dirty_since.as_ref().map(Instant::elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_tracker_is_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert!(tracker.unsaved_for().is_none());
    }

    #[test]
    fn test_mark_dirty_reports_transition_once() {
        let mut tracker = DirtyTracker::new();
        assert!(tracker.mark_dirty());
        assert!(!tracker.mark_dirty());
        assert!(tracker.is_dirty());
        assert!(tracker.since_last_change().is_some());
    }

    #[test]
    fn test_mark_saved() {
        let mut tracker = DirtyTracker::new();
        assert!(!tracker.mark_saved());

        tracker.mark_dirty();
        assert!(tracker.mark_saved());
        assert!(!tracker.is_dirty());
        assert!(tracker.unsaved_for().is_none());
        // Last change time survives the save
        assert!(tracker.since_last_change().is_some());
    }

    #[test]
    fn test_first_unsaved_change_is_kept() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty();
        thread::sleep(Duration::from_millis(20));
        tracker.mark_dirty();

        let unsaved = tracker.unsaved_for().unwrap();
        let since_last = tracker.since_last_change().unwrap();
        assert!(unsaved >= since_last);
        assert!(unsaved >= Duration::from_millis(20));
    }
}

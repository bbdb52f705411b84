//! Change notifications.

use std::fmt;

/// Something observable changed on a settings container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A member's value changed, by a setter, a load, a reset or a copy.
    Member { name: &'static str },
    /// The container moved between the saved and dirty states.
    SavedState { is_saved: bool },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&ChangeEvent) + Send>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
    silenced: bool,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub(crate) fn silence(&mut self, silenced: bool) {
        self.silenced = silenced;
    }

    pub(crate) fn is_silenced(&self) -> bool {
        self.silenced
    }

    pub(crate) fn emit(&mut self, event: &ChangeEvent) {
        if self.silenced {
            return;
        }
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("handlers", &self.handlers.len())
            .field("silenced", &self.silenced)
            .finish()
    }
}

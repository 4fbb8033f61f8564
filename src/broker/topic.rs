use std::collections::HashSet;

use crate::session::SessionId;

/// Represents a topic in the broker system.
///
/// A topic is an opaque, case-sensitive name plus the set of sessions
/// currently subscribed to it.
#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<SessionId>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Adds the subscriber. Returns `false` if it was already subscribed.
    pub fn subscribe(&mut self, id: SessionId) -> bool {
        self.subscribers.insert(id)
    }

    /// Removes the subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: &SessionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

//! Subscription registry
//!
//! `TopicRegistry` is plain, synchronous state: the live sessions and the
//! topic → subscribers mapping. It has no locking of its own; the `Broker`
//! keeps it behind a single mutex so that mutations and broadcast snapshots
//! are serialized against each other.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::broker::topic::Topic;
use crate::session::{Session, SessionId};

#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: HashMap<String, Topic>,
    sessions: HashMap<SessionId, Arc<Session>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, session: Arc<Session>) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn contains_session(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.values().cloned().collect()
    }

    /// Subscribes a live session to a topic, creating the topic on first use.
    ///
    /// Returns `false` for unknown sessions and for repeated subscriptions.
    pub fn subscribe(&mut self, topic: &str, id: &SessionId) -> bool {
        if !self.sessions.contains_key(id) {
            return false;
        }
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(id.clone())
    }

    /// Removes a session from one topic, pruning the topic once empty.
    pub fn unsubscribe(&mut self, topic: &str, id: &SessionId) -> bool {
        let Some(t) = self.topics.get_mut(topic) else {
            return false;
        };
        let removed = t.unsubscribe(id);
        if t.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }

    /// Forgets a session entirely: drops it from every topic and from the
    /// live set. Returns the session if it was still registered.
    pub fn unsubscribe_all(&mut self, id: &SessionId) -> Option<Arc<Session>> {
        let session = self.sessions.remove(id)?;
        self.topics.retain(|_, topic| {
            topic.unsubscribe(id);
            !topic.is_empty()
        });
        Some(session)
    }

    /// Snapshot of the sessions currently subscribed to `topic`.
    pub fn subscribers(&self, topic: &str) -> Vec<Arc<Session>> {
        let Some(t) = self.topics.get(topic) else {
            return Vec::new();
        };
        t.subscribers
            .iter()
            .filter_map(|id| self.sessions.get(id).cloned())
            .collect()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |t| t.subscribers.len())
    }

    pub fn subscribed_topics(&self, id: &SessionId) -> HashSet<String> {
        self.topics
            .values()
            .filter(|t| t.subscribers.contains(id))
            .map(|t| t.name.clone())
            .collect()
    }
}

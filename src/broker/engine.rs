//! Broker engine
//!
//! This module contains the broker responsible for:
//! - tracking live sessions and their topic subscriptions
//! - dispatching inbound messages by kind
//! - fanning published messages out to subscribers
//! - tearing sessions down exactly once
//!
//! Concurrency and usage notes:
//! - All registry state lives behind one `Mutex`. Subscribe, unsubscribe,
//!   broadcast snapshots and session removal are serialized through it.
//! - Replies and deliveries are queued on each session while the lock is
//!   held. Queuing never blocks; the socket write happens later on the
//!   session's own writer task, so no network I/O happens under the lock and
//!   writes to different sessions proceed in parallel.
//! - A session whose queue rejects a message is torn down after the lock is
//!   released.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::broker::registry::TopicRegistry;
use crate::session::{Session, SessionId};
use crate::transport::message::Message;

#[derive(Debug, Default)]
pub struct Broker {
    registry: Mutex<TopicRegistry>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, TopicRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a newly accepted session to the live set.
    pub fn register(&self, session: Arc<Session>) {
        debug!(session = %session.id, "registering session");
        self.registry().register(session);
    }

    /// Routes one inbound message from `session`.
    ///
    /// Messages missing a topic, and kinds a client has no business sending,
    /// are ignored without a reply.
    pub fn handle(&self, session: &Arc<Session>, msg: Message) {
        match msg {
            Message::Subscribe { topic } if !topic.is_empty() => self.subscribe(session, &topic),
            Message::Unsubscribe { topic } if !topic.is_empty() => {
                self.unsubscribe(session, &topic)
            }
            Message::Publish { topic, message } if !topic.is_empty() => {
                self.publish(session, &topic, message);
            }
            Message::Ping => {
                if session.send(Message::Pong).is_err() {
                    self.disconnect(&session.id);
                }
            }
            Message::Pong => trace!(session = %session.id, "pong received"),
            other => debug!(session = %session.id, kind = other.kind(), "ignoring message"),
        }
    }

    /// Subscribes the session and acknowledges with `suback`.
    /// Subscribing twice is harmless and acknowledged again.
    pub fn subscribe(&self, session: &Arc<Session>, topic: &str) {
        let delivered = {
            let mut registry = self.registry();
            if !registry.contains_session(&session.id) {
                return;
            }
            if registry.subscribe(topic, &session.id) {
                info!(session = %session.id, topic, "subscribed");
            }
            session
                .send(Message::Suback {
                    topic: topic.to_string(),
                })
                .is_ok()
        };

        if !delivered {
            self.disconnect(&session.id);
        }
    }

    /// Removes the session from one topic and acknowledges with `unsuback`.
    pub fn unsubscribe(&self, session: &Arc<Session>, topic: &str) {
        let delivered = {
            let mut registry = self.registry();
            if !registry.contains_session(&session.id) {
                return;
            }
            if registry.unsubscribe(topic, &session.id) {
                info!(session = %session.id, topic, "unsubscribed");
            }
            session
                .send(Message::Unsuback {
                    topic: topic.to_string(),
                })
                .is_ok()
        };

        if !delivered {
            self.disconnect(&session.id);
        }
    }

    /// Acknowledges the publisher, then delivers `content` to every session
    /// subscribed to `topic` at this moment. Returns the number of sessions
    /// the message was queued for.
    ///
    /// The acknowledgment does not depend on the topic having subscribers.
    pub fn publish(&self, publisher: &Arc<Session>, topic: &str, content: String) -> usize {
        let mut failed: Vec<SessionId> = Vec::new();
        let mut delivered = 0;

        {
            let registry = self.registry();

            if publisher.send(Message::Puback).is_err() {
                failed.push(publisher.id.clone());
            }

            let delivery = Message::Delivery {
                topic: topic.to_string(),
                message: content,
            };
            for subscriber in registry.subscribers(topic) {
                match subscriber.send(delivery.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        warn!(session = %subscriber.id, topic, error = %e, "delivery failed");
                        failed.push(subscriber.id.clone());
                    }
                }
            }
        }

        info!(session = %publisher.id, topic, subscribers = delivered, "published");

        for id in failed {
            self.disconnect(&id);
        }
        delivered
    }

    /// Tears a session down: removes it from every topic and from the live
    /// set, then closes its transport. Safe to call more than once and from
    /// any task.
    pub fn disconnect(&self, id: &SessionId) {
        let removed = self.registry().unsubscribe_all(id);
        if let Some(session) = removed {
            session.close();
            match session.peer {
                Some(peer) => info!(session = %id, %peer, "session removed"),
                None => info!(session = %id, "session removed"),
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.registry().session_count()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry().subscriber_count(topic)
    }

    pub fn subscribed_topics(&self, id: &SessionId) -> HashSet<String> {
        self.registry().subscribed_topics(id)
    }

    /// Sends an advisory `ping` to every live session. Returns how many were
    /// pinged; sessions that cannot be reached are torn down.
    pub fn ping_all(&self) -> usize {
        let mut failed: Vec<SessionId> = Vec::new();
        let mut pinged = 0;

        {
            let registry = self.registry();
            for session in registry.sessions() {
                if session.send(Message::Ping).is_ok() {
                    pinged += 1;
                } else {
                    failed.push(session.id.clone());
                }
            }
        }

        for id in failed {
            self.disconnect(&id);
        }
        pinged
    }

    /// Pings all sessions every `every`. Unanswered pings have no
    /// consequence; this only keeps idle connections exercised.
    pub async fn start_ping_loop(broker: Arc<Broker>, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pinged = broker.ping_all();
            trace!(sessions = pinged, "liveness ping sent");
        }
    }
}

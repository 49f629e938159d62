//! Topic-routed event bus.
//!
//! The `EventBus` maps topic names to the subscribers interested in them.
//! `publish` snapshots a topic's subscriber list under a shard read guard,
//! releases the guard, and hands the snapshot to a spawned delivery task.
//! A slow subscriber therefore never holds the registry lock, and the
//! publisher never waits on any subscriber.
//!
//! Delivery to bounded channels has no timeout: a subscriber that never
//! drains its channel parks that publish's delivery task forever.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use topicbus_types::config::BusConfig;
use topicbus_types::event::Event;
use tracing::{Instrument, debug, trace, trace_span};

use crate::listener::{self, ListenerHandle};
use crate::subscriber::Subscriber;

/// In-process publish/subscribe bus keyed by topic name.
///
/// Cloning the bus yields another handle on the same registry and the same
/// cancellation token.
pub struct EventBus<T = Value> {
    /// Topic -> subscribers, in subscription order. Duplicates are kept.
    topics: Arc<DashMap<String, Vec<Subscriber<T>>>>,
    /// Bounds the lifetime of listener tasks. Never touches the registry.
    cancellation: CancellationToken,
    config: Arc<BusConfig>,
}

impl<T> EventBus<T> {
    /// Create an empty bus with default configuration.
    pub fn new(cancellation: CancellationToken) -> Self {
        Self::with_config(cancellation, BusConfig::default())
    }

    pub fn with_config(cancellation: CancellationToken, config: BusConfig) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            cancellation,
            config: Arc::new(config),
        }
    }

    /// Register `subscriber` as an additional subscriber of `topic`.
    ///
    /// Never fails. Empty topic names are fine, and subscribing the same
    /// handle twice yields two deliveries per publish.
    pub fn subscribe(&self, topic: impl Into<String>, subscriber: Subscriber<T>) {
        let subscriber_id = subscriber.id();
        let topic = topic.into();
        let count = {
            let mut subscribers = self.topics.entry(topic.clone()).or_default();
            subscribers.push(subscriber);
            subscribers.len()
        };
        debug!(%topic, %subscriber_id, count, "subscribed to topic");
    }

    /// Number of registrations for `topic`, duplicates included.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |subscribers| subscribers.len())
    }

    /// Snapshot of every topic with at least one registration.
    pub fn topics(&self) -> Vec<String> {
        self.topics.iter().map(|r| r.key().clone()).collect()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }
}

impl<T> EventBus<T>
where
    T: Clone + Send + 'static,
{
    /// Publish `data` on `topic` to every subscriber registered right now.
    ///
    /// Returns immediately. Delivery happens on a spawned task that sends
    /// to the snapshotted subscribers in subscription order. Publishing to a
    /// topic without subscribers does nothing: no allocation, no task.
    ///
    /// # Panics
    ///
    /// Panics if there are subscribers and the call is made outside a Tokio
    /// runtime.
    pub fn publish(&self, topic: &str, data: T) {
        // The read guard is released at the end of this statement.
        let snapshot = match self.topics.get(topic) {
            Some(subscribers) if !subscribers.is_empty() => subscribers.value().clone(),
            _ => {
                trace!(%topic, "no subscribers, event dropped");
                return;
            }
        };

        trace!(%topic, count = snapshot.len(), "publishing event");
        let span = trace_span!("topicbus.deliver", %topic);
        tokio::spawn(deliver(Event::new(topic, data), snapshot).instrument(span));
    }

    /// Create a subscriber whose events are passed to `listener`.
    ///
    /// Spawns one background task that calls `listener(topic, data)` for each
    /// event until the bus's cancellation token fires. The returned handle
    /// still has to be subscribed to topics.
    ///
    /// `listener` runs inline in that task; if it panics the task dies and
    /// the subscriber's channel closes.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn create_subscriber<F>(&self, listener: F) -> Subscriber<T>
    where
        F: FnMut(&str, T) + Send + 'static,
    {
        let (subscriber, _detached) = self.spawn_listener(listener);
        subscriber
    }

    /// Like [`create_subscriber`](Self::create_subscriber) but also returns a
    /// handle on the background task.
    pub fn spawn_listener<F>(&self, listener: F) -> (Subscriber<T>, ListenerHandle)
    where
        F: FnMut(&str, T) + Send + 'static,
    {
        listener::spawn_listener(&self.config, self.cancellation.clone(), listener)
    }
}

async fn deliver<T: Clone>(event: Event<T>, subscribers: Vec<Subscriber<T>>) {
    for subscriber in &subscribers {
        let copy = event.clone();
        // Registrations outlive cancelled listeners, so this repeats on
        // every publish to their topics.
        if !subscriber.deliver(copy).await {
            debug!(
                topic = %event.topic,
                subscriber_id = %subscriber.id(),
                "subscriber channel closed, skipping delivery"
            );
        }
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
            cancellation: self.cancellation.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscriptions: usize = self.topics.iter().map(|r| r.value().len()).sum();
        f.debug_struct("EventBus")
            .field("topics", &self.topics.len())
            .field("subscriptions", &subscriptions)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

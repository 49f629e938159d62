//! Subscriber handles: the send side of a subscriber's delivery channel.
//!
//! The bus only ever holds a `Subscriber`, never the receiving half. The
//! subscribing party owns the receiver, drains it, and decides its capacity.

use std::fmt;

use tokio::sync::mpsc;
use topicbus_types::config::MIN_SUBSCRIBER_BUFFER;
use topicbus_types::event::Event;
use uuid::Uuid;

enum Sink<T> {
    Bounded(mpsc::Sender<Event<T>>),
    Unbounded(mpsc::UnboundedSender<Event<T>>),
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        match self {
            Sink::Bounded(tx) => Sink::Bounded(tx.clone()),
            Sink::Unbounded(tx) => Sink::Unbounded(tx.clone()),
        }
    }
}

/// Send-capable handle to one subscriber's delivery channel.
///
/// Clones share the same channel and the same id, so subscribing a clone
/// to a topic the original is already subscribed to is a duplicate
/// registration and receives duplicate deliveries.
pub struct Subscriber<T> {
    id: Uuid,
    sink: Sink<T>,
}

impl<T> Subscriber<T> {
    /// Create a bounded delivery channel.
    ///
    /// Capacity is clamped to at least 1; a capacity-1 channel is the
    /// closest tokio equivalent of a rendezvous hand-off.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Event<T>>) {
        let (tx, rx) = mpsc::channel(capacity.max(MIN_SUBSCRIBER_BUFFER));
        (Self::from(tx), rx)
    }

    /// Create an unbounded delivery channel. Deliveries never wait.
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<Event<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from(tx), rx)
    }

    /// Identifier used in log fields. Shared by clones.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        match &self.sink {
            Sink::Bounded(tx) => tx.is_closed(),
            Sink::Unbounded(tx) => tx.is_closed(),
        }
    }

    /// Whether both handles feed the same channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        match (&self.sink, &other.sink) {
            (Sink::Bounded(a), Sink::Bounded(b)) => a.same_channel(b),
            (Sink::Unbounded(a), Sink::Unbounded(b)) => a.same_channel(b),
            _ => false,
        }
    }

    /// Hand one event to the subscriber's channel.
    ///
    /// For bounded channels this waits until the channel has room, with no
    /// timeout. Returns `false` if the receiver has been dropped.
    pub async fn deliver(&self, event: Event<T>) -> bool {
        match &self.sink {
            Sink::Bounded(tx) => tx.send(event).await.is_ok(),
            Sink::Unbounded(tx) => tx.send(event).is_ok(),
        }
    }
}

impl<T> From<mpsc::Sender<Event<T>>> for Subscriber<T> {
    fn from(tx: mpsc::Sender<Event<T>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sink: Sink::Bounded(tx),
        }
    }
}

impl<T> From<mpsc::UnboundedSender<Event<T>>> for Subscriber<T> {
    fn from(tx: mpsc::UnboundedSender<Event<T>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sink: Sink::Unbounded(tx),
        }
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sink: self.sink.clone(),
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.sink {
            Sink::Bounded(_) => "bounded",
            Sink::Unbounded(_) => "unbounded",
        };
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_deliver_reaches_receiver() {
        let (subscriber, mut rx) = Subscriber::bounded(4);
        assert!(subscriber.deliver(Event::new("t", 7u32)).await);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic, "t");
        assert_eq!(event.data, 7);
    }

    #[tokio::test]
    async fn unbounded_deliver_reaches_receiver() {
        let (subscriber, mut rx) = Subscriber::unbounded();
        for i in 0..100u32 {
            assert!(subscriber.deliver(Event::new("t", i)).await);
        }
        for i in 0..100u32 {
            assert_eq!(rx.recv().await.unwrap().data, i);
        }
    }

    #[tokio::test]
    async fn deliver_to_dropped_receiver_returns_false() {
        let (subscriber, rx) = Subscriber::<u32>::bounded(1);
        drop(rx);
        assert!(subscriber.is_closed());
        assert!(!subscriber.deliver(Event::new("t", 1)).await);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (subscriber, _rx) = Subscriber::<()>::bounded(0);
        assert!(!subscriber.is_closed());
    }

    #[test]
    fn clone_shares_id_and_channel() {
        let (a, _rx) = Subscriber::<()>::unbounded();
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert!(a.same_channel(&b));
    }

    #[test]
    fn distinct_subscribers_have_distinct_ids() {
        let (a, _rx_a) = Subscriber::<()>::bounded(1);
        let (b, _rx_b) = Subscriber::<()>::bounded(1);
        assert_ne!(a.id(), b.id());
        assert!(!a.same_channel(&b));
    }

    #[test]
    fn from_caller_owned_sender() {
        let (tx, _rx) = mpsc::channel::<Event<String>>(8);
        let subscriber = Subscriber::from(tx.clone());
        assert!(!subscriber.is_closed());
        let debug = format!("{subscriber:?}");
        assert!(debug.contains("bounded"));
    }
}

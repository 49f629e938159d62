//! The event value carried through the bus.
//!
//! An `Event` pairs a topic name with an opaque payload. The bus routes on
//! the topic only; the payload is never inspected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A published event: the topic it was published on plus its payload.
///
/// The payload type defaults to `serde_json::Value` so that callers who do
/// not want a dedicated event type can still send arbitrary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T = Value> {
    /// Topic the event was published on.
    pub topic: String,
    /// Opaque payload, interpreted by sender and receiver only.
    pub data: T,
}

impl<T> Event<T> {
    pub fn new(topic: impl Into<String>, data: T) -> Self {
        Self {
            topic: topic.into(),
            data,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Split the event into its topic and payload.
    pub fn into_parts(self) -> (String, T) {
        (self.topic, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_accepts_str_and_string_topics() {
        let a = Event::new("ORDER_CREATED", json!({"id": 42}));
        let b = Event::new(String::from("ORDER_CREATED"), json!({"id": 42}));
        assert_eq!(a, b);
        assert_eq!(a.topic(), "ORDER_CREATED");
        assert_eq!(a.data()["id"], 42);
    }

    #[test]
    fn into_parts_returns_owned_fields() {
        let event = Event::new("t", vec![1u8, 2, 3]);
        let (topic, data) = event.into_parts();
        assert_eq!(topic, "t");
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn default_payload_serializes_as_json_object() {
        let event: Event = Event::new("user.created", json!({"name": "luna"}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"topic": "user.created", "data": {"name": "luna"}}));
    }

    #[test]
    fn empty_topic_is_allowed() {
        let event = Event::new("", ());
        assert!(event.topic().is_empty());
    }
}

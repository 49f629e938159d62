//! In-process publish/subscribe event bus.
//!
//! An [`EventBus`] maps topic names to [`Subscriber`] handles and fans each
//! published event out to every subscriber of its topic on a background
//! task. The listener adapter ([`EventBus::create_subscriber`]) turns a
//! subscriber channel into callback invocations that stop when the bus's
//! cancellation token fires.
//!
//! ```no_run
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//! use topicbus_core::EventBus;
//!
//! # async fn demo() {
//! let bus: EventBus = EventBus::new(CancellationToken::new());
//! let subscriber = bus.create_subscriber(|topic, data| {
//!     tracing::info!(%topic, %data, "event received");
//! });
//! bus.subscribe("ORDER_CREATED", subscriber);
//! bus.publish("ORDER_CREATED", json!({"id": 42}));
//! # }
//! ```

pub mod bus;
pub mod listener;
pub mod subscriber;

pub use bus::EventBus;
pub use listener::{ListenerError, ListenerHandle};
pub use subscriber::Subscriber;
pub use topicbus_types::event::Event;

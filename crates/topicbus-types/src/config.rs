//! Configuration types for topicbus.
//!
//! `BusConfig` represents `topicbus.toml`: the channel sizing used by
//! listener-adapter subscribers and the logging setup.

use serde::{Deserialize, Serialize};

/// Smallest channel capacity a bounded subscriber can have.
pub const MIN_SUBSCRIBER_BUFFER: usize = 1;

/// Top-level bus configuration. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Capacity of channels created by the listener adapter.
    ///
    /// A value of 1 is the closest equivalent of a rendezvous hand-off.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,

    /// Create unbounded adapter channels instead of bounded ones.
    #[serde(default)]
    pub unbounded_subscribers: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_subscriber_buffer() -> usize {
    1
}

impl BusConfig {
    /// Subscriber buffer with the minimum capacity enforced.
    pub fn effective_buffer(&self) -> usize {
        self.subscriber_buffer.max(MIN_SUBSCRIBER_BUFFER)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
            unbounded_subscribers: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Output format of the fmt tracing layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging setup consumed by `topicbus-observe`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directives (e.g. `"topicbus_core=debug"`). Falls back to
    /// `RUST_LOG` when unset.
    #[serde(default)]
    pub filter: Option<String>,

    /// Bridge spans to OpenTelemetry with a stdout exporter.
    #[serde(default)]
    pub otel_stdout: bool,
}

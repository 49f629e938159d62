//! Infrastructure layer for topicbus.
//!
//! Locates and reads `topicbus.toml` from disk into a
//! [`BusConfig`](topicbus_types::config::BusConfig).

pub mod config;

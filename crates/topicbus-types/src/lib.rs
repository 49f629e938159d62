//! Shared data types for topicbus.
//!
//! Events, configuration and the error types shared between the core bus
//! and its infrastructure crates. No runtime dependencies -- only serde and
//! thiserror.

pub mod config;
pub mod error;
pub mod event;

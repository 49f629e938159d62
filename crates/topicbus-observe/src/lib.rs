//! Observability setup for applications embedding topicbus.

pub mod tracing_setup;

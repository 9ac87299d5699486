//! Test harness for a message-broker deployment: synthetic telemetry events
//! published over MQTT and read back from a Kafka topic.

pub mod config;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod roles;
pub mod sample;
pub mod shutdown;
pub mod transport;

//! Kafka consumer construction via rdkafka.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use tracing::info;

use crate::transport::TransportError;

/// Build a stream consumer bound to one topic, reading from the earliest
/// available offset when the group has no committed position.
pub fn create_consumer(
    brokers: &str,
    group_id: &str,
    topic: &str,
) -> Result<StreamConsumer, TransportError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.partition.eof", "false")
        .create()
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    consumer
        .subscribe(&[topic])
        .map_err(|e| TransportError::Subscribe(e.to_string()))?;
    info!(%brokers, group = %group_id, %topic, "subscribed to topic");

    Ok(consumer)
}

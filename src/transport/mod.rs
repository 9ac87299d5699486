//! Broker seams: the publish-side sink trait, Kafka consumer construction,
//! and the transport error taxonomy.

pub mod kafka;
#[cfg(any(test, feature = "transport-mock"))]
pub mod mock;
pub mod mqtt;

use bytes::Bytes;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("connect: {0}")]
    Connect(String),
    #[error("publish: {0}")]
    Publish(String),
    #[error("subscribe: {0}")]
    Subscribe(String),
}

/// Publish-side seam. Emitters only ever see this trait, which is what lets
/// the smoke tests substitute an in-memory sink for the broker.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), TransportError>;
    async fn shutdown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

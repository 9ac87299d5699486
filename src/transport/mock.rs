//! In-memory sink for exercising emitters without a broker.

use std::sync::Mutex;

use bytes::Bytes;

use crate::transport::{EventSink, TransportError};

#[derive(Default)]
pub struct MockSink {
    records: Mutex<Vec<(String, Bytes)>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records published so far, in publish order.
    pub fn records(&self) -> Vec<(String, Bytes)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EventSink for MockSink {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), TransportError> {
        self.records.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}

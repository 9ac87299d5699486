use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One synthetic telemetry reading. Constructed, serialized, published and
/// dropped within a single emitter iteration; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEvent {
    pub client_id: String,
    pub code: String,
    pub value: i64,
    pub timestamp: i64,
}

impl PluginEvent {
    /// Build an event stamped with the current instant in epoch milliseconds.
    pub fn new(client_id: &str, code: &str, value: i64) -> Self {
        Self {
            client_id: client_id.to_string(),
            code: code.to_string(),
            value,
            timestamp: now_millis(),
        }
    }

    /// Historical comma-delimited record: `client_id,code,value,timestamp`.
    pub fn to_record(&self) -> String {
        format!(
            "{},{},{},{}",
            self.client_id, self.code, self.value, self.timestamp
        )
    }
}

/// Current instant in milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Wire encoding for published events. JSON is the canonical format and the
/// only one the consumer decodes; the comma-delimited form is kept for
/// compatibility-testing the historical pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WireFormat {
    Json,
    Csv,
}

impl WireFormat {
    pub fn encode(&self, event: &PluginEvent) -> Result<Bytes, serde_json::Error> {
        match self {
            WireFormat::Json => Ok(Bytes::from(serde_json::to_vec(event)?)),
            WireFormat::Csv => Ok(Bytes::from(event.to_record().into_bytes())),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Json => write!(f, "json"),
            WireFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Fixed configuration of one periodic emitter, immutable after startup.
/// `max < min` is a caller contract violation.
#[derive(Clone, Copy, Debug)]
pub struct EmitterSpec {
    pub code: &'static str,
    pub min: i64,
    pub max: i64,
    pub interval: Duration,
}

impl EmitterSpec {
    pub fn topic(&self) -> String {
        format!("plugins/{}", self.code)
    }
}

/// The three signal classes every generator process emits.
pub fn default_emitters() -> [EmitterSpec; 3] {
    [
        EmitterSpec {
            code: "0001",
            min: 0,
            max: 1023,
            interval: Duration::from_secs(10),
        },
        EmitterSpec {
            code: "0002",
            min: 127,
            max: 255,
            interval: Duration::from_secs(20),
        },
        EmitterSpec {
            code: "0003",
            min: -32768,
            max: 32767,
            interval: Duration::from_secs(30),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout_is_comma_delimited() {
        let event = PluginEvent {
            client_id: "c1".to_string(),
            code: "0001".to_string(),
            value: 42,
            timestamp: 1_700_000_000_000,
        };
        assert_eq!(event.to_record(), "c1,0001,42,1700000000000");
    }

    #[test]
    fn json_field_names_match_the_wire_contract() {
        let event = PluginEvent {
            client_id: "c1".to_string(),
            code: "0002".to_string(),
            value: -7,
            timestamp: 1_700_000_000_000,
        };
        let bytes = WireFormat::Json.encode(&event).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["client_id"], "c1");
        assert_eq!(value["code"], "0002");
        assert_eq!(value["value"], -7);
        assert_eq!(value["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn json_encoding_round_trips() {
        let event = PluginEvent::new("c1", "0003", -32768);
        let bytes = WireFormat::Json.encode(&event).unwrap();
        let decoded: PluginEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn default_emitters_cover_the_three_signal_classes() {
        let emitters = default_emitters();
        assert_eq!(emitters.len(), 3);
        assert_eq!(emitters[0].code, "0001");
        assert_eq!((emitters[0].min, emitters[0].max), (0, 1023));
        assert_eq!(emitters[0].interval, Duration::from_secs(10));
        assert_eq!(emitters[1].code, "0002");
        assert_eq!((emitters[1].min, emitters[1].max), (127, 255));
        assert_eq!(emitters[1].interval, Duration::from_secs(20));
        assert_eq!(emitters[2].code, "0003");
        assert_eq!((emitters[2].min, emitters[2].max), (-32768, 32767));
        assert_eq!(emitters[2].interval, Duration::from_secs(30));
        for spec in emitters {
            assert!(spec.min <= spec.max);
            assert_eq!(spec.topic(), format!("plugins/{}", spec.code));
        }
    }
}

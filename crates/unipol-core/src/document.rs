//! Data Model: log documents consumed by the pre-processor
use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{PreprocessError, Result};

/// A unit of input to the streaming engine.
///
/// Only the timestamp is interpreted by the engine; every other field is read
/// by the event kinds that understand the concrete document type.
pub trait Document {
    /// Unix timestamp in milliseconds. Non-decreasing across one input stream.
    fn unix_ts(&self) -> i64;
}

/// One log entry emitted by a testnet node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDoc {
    /// Unix milliseconds; accepts an integer or an RFC 3339 string on input
    #[serde(alias = "@timestamp", deserialize_with = "de_timestamp")]
    pub timestamp: i64,
    /// Node that emitted the entry
    pub host: String,
    /// Subnet the emitting node belonged to, when the log source knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Emitting component (ex: "consensus::finalizer")
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
    /// Structured key/value pairs attached by the logger
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl LogDoc {
    pub fn new(timestamp: i64, host: impl Into<String>) -> Self {
        Self {
            timestamp,
            host: host.into(),
            subnet: None,
            component: String::new(),
            level: "INFO".to_string(),
            message: String::new(),
            fields: Map::new(),
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_subnet(mut self, subnet: impl Into<String>) -> Self {
        self.subnet = Some(subnet.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse one newline-delimited JSON record
    pub fn from_json_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| PreprocessError::MalformedDocument(e.to_string()))
    }

    /// String-valued structured field
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl Document for LogDoc {
    fn unix_ts(&self) -> i64 {
        self.timestamp
    }
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(ms) => Ok(ms),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.timestamp_millis())
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_timestamp() {
        let doc = LogDoc::from_json_line(
            r#"{"timestamp": 1700000000123, "host": "node-1", "message": "hello"}"#,
        )
        .unwrap();
        assert_eq!(doc.unix_ts(), 1_700_000_000_123);
        assert_eq!(doc.host, "node-1");
        assert_eq!(doc.level, "");
        assert!(doc.subnet.is_none());
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let doc = LogDoc::from_json_line(
            r#"{"@timestamp": "2023-11-14T22:13:20.500Z", "host": "node-2"}"#,
        )
        .unwrap();
        assert_eq!(doc.unix_ts(), 1_700_000_000_500);
    }

    #[test]
    fn test_malformed_document() {
        let err = LogDoc::from_json_line(r#"{"timestamp": "yesterday", "host": "n"}"#).unwrap_err();
        assert!(matches!(err, PreprocessError::MalformedDocument(_)));

        let err = LogDoc::from_json_line(r#"{"host": "n"}"#).unwrap_err();
        assert!(matches!(err, PreprocessError::MalformedDocument(_)));
    }

    #[test]
    fn test_from_json_value() {
        let doc: LogDoc = serde_json::from_value(serde_json::json!({
            "timestamp": 42,
            "host": "node-3",
            "subnet": "app",
            "component": "consensus::finalizer",
            "fields": {"replica_version": "0.9.0"}
        }))
        .unwrap();
        assert_eq!(doc.subnet.as_deref(), Some("app"));
        assert_eq!(doc.field_str("replica_version"), Some("0.9.0"));
        assert_eq!(doc.message, "");
    }

    #[test]
    fn test_field_str() {
        let doc = LogDoc::new(1, "n").with_field("replica_version", "abc").with_field("n", 3);
        assert_eq!(doc.field_str("replica_version"), Some("abc"));
        assert_eq!(doc.field_str("n"), None);
        assert_eq!(doc.field_str("missing"), None);
    }
}

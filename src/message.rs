//! Outbound message types
//!
//! Messages pushed to subscribers. Framing is left to the transport.
//! Messages are shared between subscribers behind an `Arc`, so a broadcast
//! clones a pointer per subscriber rather than the payload.

use serde::Serialize;

use crate::registry::TopicSnapshot;

/// Confirmation text sent after the snapshot on connect
pub const CONNECTED_TEXT: &str = "Connection established";

/// A message delivered to subscribers
///
/// Serialized untagged, so each variant has its own JSON shape:
/// - `Snapshot` → `{"topics":[{"id":"A","title":"Station A","status":"active"}]}`
/// - `Reading` → `{"value":42.0,"topicId":"B"}`
/// - `Connected` → `"Connection established"`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// Status of every topic, sent once on subscribe
    Snapshot {
        /// Topic rows in registry order
        topics: Vec<TopicSnapshot>,
    },
    /// A reading popped by the dispatch loop
    Reading {
        /// Measured value
        value: f64,
        /// Topic the reading was ingested into
        #[serde(rename = "topicId")]
        topic_id: String,
    },
    /// Connection confirmation
    Connected(String),
}

impl Message {
    /// Create a snapshot message
    pub fn snapshot(topics: Vec<TopicSnapshot>) -> Self {
        Message::Snapshot { topics }
    }

    /// Create a reading message
    pub fn reading(value: f64, topic_id: impl Into<String>) -> Self {
        Message::Reading {
            value,
            topic_id: topic_id.into(),
        }
    }

    /// Create the standard connection confirmation
    pub fn connected() -> Self {
        Message::Connected(CONNECTED_TEXT.to_string())
    }

    /// Whether this is a reading message
    pub fn is_reading(&self) -> bool {
        matches!(self, Message::Reading { .. })
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TopicStatus;

    #[test]
    fn test_reading_json_shape() {
        let message = Message::reading(42.0, "B");

        assert_eq!(message.to_json().unwrap(), r#"{"value":42.0,"topicId":"B"}"#);
        assert!(message.is_reading());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let message = Message::snapshot(vec![
            TopicSnapshot {
                id: "A".into(),
                title: "Station A".into(),
                status: TopicStatus::Active,
            },
            TopicSnapshot {
                id: "B".into(),
                title: "Station B".into(),
                status: TopicStatus::Inactive,
            },
        ]);

        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value["topics"][0]["status"], "active");
        assert_eq!(value["topics"][1]["id"], "B");
        assert_eq!(value["topics"][1]["status"], "inactive");
        assert!(!message.is_reading());
    }

    #[test]
    fn test_connected_json_shape() {
        assert_eq!(
            Message::connected().to_json().unwrap(),
            r#""Connection established""#
        );
    }
}

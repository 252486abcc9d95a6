//! Input records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One support ticket.
///
/// `timestamp` is carried through untouched; clustering never looks at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Caller-assigned identifier; must be non-empty.
    pub id: String,
    /// Raw ticket text, possibly empty.
    #[serde(default)]
    pub text: String,
    /// When the ticket was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Ticket without a timestamp.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: None,
        }
    }

    /// Attach a timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_optional_fields() {
        let t: Ticket = serde_json::from_str(r#"{"id": "T1"}"#).unwrap();
        assert_eq!(t, Ticket::new("T1", ""));
    }

    #[test]
    fn test_timestamp_round_trips() {
        let t: Ticket = serde_json::from_str(
            r#"{"id": "T9", "text": "refund", "timestamp": "2025-10-01T08:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            t.timestamp.map(|ts| ts.to_rfc3339()).as_deref(),
            Some("2025-10-01T08:30:00+00:00")
        );
    }
}

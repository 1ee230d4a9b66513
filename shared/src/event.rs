//! Outbound event names and the webhook payload envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle event names deliverable to webhook subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "booking.created")]
    BookingCreated,
    #[serde(rename = "booking.updated")]
    BookingUpdated,
    #[serde(rename = "booking.cancelled")]
    BookingCancelled,
    #[serde(rename = "booking.completed")]
    BookingCompleted,
    #[serde(rename = "availability.changed")]
    AvailabilityChanged,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::BookingCreated,
        EventType::BookingUpdated,
        EventType::BookingCancelled,
        EventType::BookingCompleted,
        EventType::AvailabilityChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::BookingCreated => "booking.created",
            EventType::BookingUpdated => "booking.updated",
            EventType::BookingCancelled => "booking.cancelled",
            EventType::BookingCompleted => "booking.completed",
            EventType::AvailabilityChanged => "availability.changed",
        }
    }

    pub fn parse(s: &str) -> Option<EventType> {
        EventType::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON body POSTed to every subscriber
///
/// Serialized once per event; the per-subscriber signature is computed
/// over these exact bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: EventType,
    /// RFC3339 UTC emission time
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl EventEnvelope {
    pub fn new(event_type: EventType, data: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_event_names() {
        assert_eq!(EventType::BookingCreated.as_str(), "booking.created");
        assert_eq!(EventType::AvailabilityChanged.as_str(), "availability.changed");
    }

    #[test]
    fn test_parse_roundtrip() {
        for e in EventType::ALL {
            assert_eq!(EventType::parse(e.as_str()), Some(e));
        }
        assert_eq!(EventType::parse("booking.deleted"), None);
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = EventEnvelope {
            event_type: EventType::BookingCancelled,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            data: json!({"booking_id": 42, "reason": "customer request"}),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"event_type\":\"booking.cancelled\""));
        assert!(json.contains("2026-03-02T12:00:00Z"));
        assert!(json.contains("\"booking_id\":42"));
    }
}

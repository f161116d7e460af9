use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ============================================================================
// Event Envelope - Session Event Metadata
// ============================================================================
//
// Wraps workflow events with the metadata needed to trace a session:
// which session emitted it, in what order, and which user action caused it.
//
// ============================================================================

/// Generic Event Envelope - wraps any workflow event with metadata
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub session_id: Uuid,
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,

    // Event Payload
    pub event_data: E,

    // Groups every event produced by one dispatched command
    pub correlation_id: Uuid,

    // Who triggered this event
    pub user_id: Option<String>,

    pub timestamp: DateTime<Utc>,

    pub metadata: HashMap<String, String>,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        session_id: Uuid,
        sequence_number: i64,
        event_type: impl Into<String>,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            session_id,
            sequence_number,
            event_type: event_type.into(),
            event_data,
            correlation_id,
            user_id: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Events that can be journaled must report a stable type name
pub trait DomainEvent: Serialize + Clone {
    fn event_type(&self) -> &'static str;
}

pub fn serialize_event<E: Serialize>(event: &E) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct TestEvent {
        data: String,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str { "TestEvent" }
    }

    #[test]
    fn test_event_envelope_creation() {
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let event = TestEvent {
            data: "test".to_string(),
        };
        let event_type = event.event_type();

        let envelope = EventEnvelope::new(session_id, 1, event_type, event, correlation_id)
            .with_user("user-1")
            .with_metadata("command", "Expand");

        assert_eq!(envelope.session_id, session_id);
        assert_eq!(envelope.sequence_number, 1);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.correlation_id, correlation_id);
        assert_eq!(envelope.user_id.as_deref(), Some("user-1"));
        assert_eq!(envelope.metadata.get("command").map(String::as_str), Some("Expand"));
    }

    #[test]
    fn test_event_serialization() {
        let event = TestEvent {
            data: "test data".to_string(),
        };

        let json = serialize_event(&event).unwrap();
        let deserialized: TestEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.data, deserialized.data);
    }
}

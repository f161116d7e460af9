use std::marker::PhantomData;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope, serialize_event};

// ============================================================================
// Session Event Journal - In-Memory, Append-Only
// ============================================================================
//
// Responsibilities:
// 1. Append events for a single session (append-only)
// 2. Enforce strictly increasing sequence numbers (optimistic concurrency)
// 3. Expose the history for inspection and replay
//
// Nothing is persisted: the journal lives and dies with its session.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    #[error("Cannot append empty event list")]
    EmptyAppend,

    #[error("Concurrency conflict: expected version {expected}, but current is {current}")]
    VersionConflict { expected: i64, current: i64 },

    #[error("Event sequence gap: expected {expected}, got {actual}")]
    SequenceGap { expected: i64, actual: i64 },
}

pub struct EventJournal<E: DomainEvent> {
    entries: Vec<EventEnvelope<E>>,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> EventJournal<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Append events to the journal
    /// Returns the new version number after appending
    pub fn append_events(
        &mut self,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, JournalError> {
        if events.is_empty() {
            return Err(JournalError::EmptyAppend);
        }

        let current = self.current_version();
        if current != expected_version {
            return Err(JournalError::VersionConflict {
                expected: expected_version,
                current,
            });
        }

        let mut new_version = expected_version;
        for envelope in &events {
            new_version += 1;
            if envelope.sequence_number != new_version {
                return Err(JournalError::SequenceGap {
                    expected: new_version,
                    actual: envelope.sequence_number,
                });
            }
        }

        tracing::trace!(
            new_version = new_version,
            event_count = events.len(),
            "Appended events to session journal"
        );

        self.entries.extend(events);
        Ok(new_version)
    }

    pub fn current_version(&self) -> i64 {
        self.entries.last().map(|e| e.sequence_number).unwrap_or(0)
    }

    pub fn events(&self) -> &[EventEnvelope<E>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event type names in append order
    pub fn event_types(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.event_type.as_str()).collect()
    }

    /// One JSON document per event payload, for debug dumps
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for envelope in &self.entries {
            out.push_str(&serialize_event(&envelope.event_data)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl<E: DomainEvent> Default for EventJournal<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

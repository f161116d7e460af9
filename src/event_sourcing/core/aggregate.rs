use uuid::Uuid;
use super::event::EventEnvelope;

// ============================================================================
// Aggregate Pattern - State Machine Core
// ============================================================================
//
// Key Principles:
// 1. State is derived from events (never mutated directly by callers)
// 2. Commands are validated before emitting events
// 3. Events represent facts that have already happened
// 4. Side effects are computed from events, never performed here
//
// ============================================================================

/// Generic Aggregate trait - every session state machine implements this
///
/// Type Parameters:
/// - `Event`: The event type emitted by this aggregate
/// - `Command`: The command type accepted by this aggregate
/// - `Error`: The error type for rule violations
pub trait Aggregate: Sized {
    type Event;
    type Command;
    type Error;

    /// Apply an event to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Get aggregate ID
    fn aggregate_id(&self) -> Uuid;

    /// Get current version (sequence number of the last applied event)
    fn version(&self) -> i64;

    /// Replay a recorded history on top of an initial state
    fn replay<'a, I>(mut self, events: I) -> Result<Self, Self::Error>
    where
        I: IntoIterator<Item = &'a EventEnvelope<Self::Event>>,
        Self::Event: 'a,
    {
        for envelope in events {
            self.apply_event(&envelope.event_data)?;
        }
        Ok(self)
    }
}

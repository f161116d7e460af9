// ============================================================================
// Event Sourcing Store - Session Journal
// ============================================================================
//
// Generic, in-memory journal that works with ANY event type.
//
// ============================================================================

pub mod journal;

pub use journal::{EventJournal, JournalError};

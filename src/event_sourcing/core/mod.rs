// ============================================================================
// Event Sourcing Core - Generic Abstractions
// ============================================================================
//
// Key Principles:
// - No domain-specific code (no Order, Product, etc.)
// - Generic over aggregate types
//
// ============================================================================

pub mod aggregate;
pub mod event;

// Re-export core types for convenience
pub use aggregate::Aggregate;
pub use event::{DomainEvent, EventEnvelope, serialize_event};

// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable state-machine infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - works with any aggregate)
mod core;
mod store;

// Re-export core infrastructure
pub use self::core::*;
pub use self::store::*;

// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Generic, reusable pieces the session actor is built from.
//
// ============================================================================

pub mod timers;

pub use timers::*;

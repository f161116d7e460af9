// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory; `effects` is the shared vocabulary the
// state machines use to ask the session for side effects.
//
// This layer never talks to collaborators directly.
//
// ============================================================================

pub mod catalog;
pub mod effects;
pub mod returns;

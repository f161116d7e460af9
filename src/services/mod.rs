// ============================================================================
// Services - External Collaborators
// ============================================================================
//
// ports     - traits the session depends on
// in_memory - recording implementations for the demo binary and tests
//
// ============================================================================

pub mod in_memory;
pub mod ports;

pub use in_memory::*;
pub use ports::*;

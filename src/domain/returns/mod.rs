// ============================================================================
// Returns Domain - Return Request Workflow
// ============================================================================
//
// This module contains ALL return-specific code:
// - Value objects (Order, OrderItem, OrderStatus)
// - Selection set (items marked for return)
// - Submission (ReturnRequest validation and packaging)
// - Events, Commands, Errors
// - Aggregate (ReturnWorkflow state machine)
// - Command Handler (ReturnsCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod selection;
pub mod submission;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use selection::*;
pub use submission::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;

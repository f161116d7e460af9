// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based session runtime.
//
// Structure:
// - core/    - Reusable pieces (cancellable timer registry)
// - session  - StorefrontSession, one actor per customer session
//
// Note: Workflow rules live in the domain CommandHandlers, NOT in actors.
//       The session only routes commands and executes the effects they emit.
//
// ============================================================================

// Private module declarations
mod core;
mod session;

// Re-export only what's needed in the public API
pub use self::core::TimerRegistry;
pub use session::{
    AddToCart,
    Collaborators,
    Dispatch,
    ExportJournal,
    GetCard,
    GetReturnsView,
    OpenReturns,
    PendingTimers,
    ReportImage,
    ReturnsPage,
    SessionError,
    StorefrontSession,
    Teardown,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::JournalError;
use super::value_objects::{ItemId, OrderId, OrderStatus};

// ============================================================================
// Return Validation Failures
// ============================================================================
//
// Surfaced to the customer as destructive notifications; never escalated.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationError {
    #[error("No items selected")]
    EmptySelection,

    #[error("Reason required")]
    EmptyReason,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::EmptySelection => "No items selected",
            ValidationError::EmptyReason => "Reason required",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ValidationError::EmptySelection => "Please select at least one item to return",
            ValidationError::EmptyReason => "Please provide a reason for your return",
        }
    }

    /// Metric label
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptySelection => "empty_selection",
            ValidationError::EmptyReason => "empty_reason",
        }
    }
}

// ============================================================================
// Returns Workflow Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReturnsError {
    #[error("Order not found: {0}")]
    UnknownOrder(OrderId),

    #[error("Order {order_id} cannot be returned in status {status:?}")]
    OrderNotReturnable { order_id: OrderId, status: OrderStatus },

    #[error("Item {item_id} does not belong to order {order_id}")]
    ItemNotInOrder { item_id: ItemId, order_id: OrderId },

    #[error("Command {command} is not valid in state {state}")]
    InvalidTransition { state: &'static str, command: &'static str },

    #[error("No return request is in flight")]
    NoPendingRequest,

    #[error("Outcome for request {request_id} does not match in-flight request {in_flight}")]
    StaleOutcome { request_id: Uuid, in_flight: Uuid },

    #[error("Journal rejected events: {0}")]
    Journal(#[from] JournalError),
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::DomainEvent;
use super::errors::ValidationError;
use super::submission::ReturnRequest;
use super::value_objects::{ItemId, OrderId};

// ============================================================================
// Returns Events - Facts emitted by the return workflow
// ============================================================================

/// Returns Event - Union type for all workflow events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReturnsEvent {
    OrderExpanded(OrderExpanded),
    OrderCollapsed(OrderCollapsed),
    ItemToggled(ItemToggled),
    DetailOpened(DetailOpened),
    SelectionResumed(SelectionResumed),
    ReasonUpdated(ReasonUpdated),
    ValidationFailed(ValidationFailed),
    ReturnSubmitted(ReturnSubmitted),
    ReturnAccepted(ReturnAccepted),
    ReturnRejected(ReturnRejected),
    WorkflowReset(WorkflowReset),
}

impl DomainEvent for ReturnsEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReturnsEvent::OrderExpanded(_) => "OrderExpanded",
            ReturnsEvent::OrderCollapsed(_) => "OrderCollapsed",
            ReturnsEvent::ItemToggled(_) => "ItemToggled",
            ReturnsEvent::DetailOpened(_) => "DetailOpened",
            ReturnsEvent::SelectionResumed(_) => "SelectionResumed",
            ReturnsEvent::ReasonUpdated(_) => "ReasonUpdated",
            ReturnsEvent::ValidationFailed(_) => "ValidationFailed",
            ReturnsEvent::ReturnSubmitted(_) => "ReturnSubmitted",
            ReturnsEvent::ReturnAccepted(_) => "ReturnAccepted",
            ReturnsEvent::ReturnRejected(_) => "ReturnRejected",
            ReturnsEvent::WorkflowReset(_) => "WorkflowReset",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Expanded - a fresh, empty selection is scoped to this order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderExpanded {
    pub order_id: OrderId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderCollapsed {
    pub order_id: OrderId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ItemToggled {
    pub item_id: ItemId,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailOpened {
    pub item_count: usize,
}

/// Selection Resumed - back from the detail step, selection kept
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectionResumed {
    pub order_id: OrderId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReasonUpdated {
    pub reason: String,
}

/// Validation Failed - guard rejected the command, state unchanged
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationFailed {
    pub error: ValidationError,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReturnSubmitted {
    pub request: ReturnRequest,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReturnAccepted {
    pub request_id: Uuid,
    pub order_id: OrderId,
    pub item_ids: Vec<ItemId>,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReturnRejected {
    pub request_id: Uuid,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetCause {
    ConfirmationElapsed,
    ContinueShopping,
    NavigatedAway,
}

/// Workflow Reset - back to browsing with selection and reason cleared
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowReset {
    pub cause: ResetCause,
}

use uuid::Uuid;

use super::value_objects::{ItemId, OrderId};

// ============================================================================
// Returns Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnsCommand {
    /// Click on an order header: expands it, or collapses it if already open
    Expand { order_id: OrderId },
    Collapse,
    ToggleItem { item_id: ItemId },
    ContinueWithSelection,
    Back,
    UpdateReason { reason: String },
    Submit,
    /// Order service answers carry the id of the request they answer
    SubmissionAccepted { request_id: Uuid },
    SubmissionRejected { request_id: Uuid, message: String },
    ConfirmationElapsed,
    ContinueShopping,
    /// Navigation away from the returns page
    Reset,
}

impl ReturnsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ReturnsCommand::Expand { .. } => "Expand",
            ReturnsCommand::Collapse => "Collapse",
            ReturnsCommand::ToggleItem { .. } => "ToggleItem",
            ReturnsCommand::ContinueWithSelection => "ContinueWithSelection",
            ReturnsCommand::Back => "Back",
            ReturnsCommand::UpdateReason { .. } => "UpdateReason",
            ReturnsCommand::Submit => "Submit",
            ReturnsCommand::SubmissionAccepted { .. } => "SubmissionAccepted",
            ReturnsCommand::SubmissionRejected { .. } => "SubmissionRejected",
            ReturnsCommand::ConfirmationElapsed => "ConfirmationElapsed",
            ReturnsCommand::ContinueShopping => "ContinueShopping",
            ReturnsCommand::Reset => "Reset",
        }
    }
}

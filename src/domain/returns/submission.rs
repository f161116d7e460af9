use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ValidationError;
use super::selection::SelectionSet;
use super::value_objects::{OrderId, OrderItem};

// ============================================================================
// Return Request - validated payload handed to the order service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    request_id: Uuid,
    order_id: OrderId,
    items: Vec<OrderItem>,
    reason: String,
    requested_at: DateTime<Utc>,
}

impl ReturnRequest {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

pub struct ReturnSubmission;

impl ReturnSubmission {
    /// Package the selection and reason, or report the first unmet rule.
    /// An empty selection is reported before a blank reason.
    pub fn build(selection: &SelectionSet, reason: &str) -> Result<ReturnRequest, ValidationError> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyReason);
        }

        Ok(ReturnRequest {
            request_id: Uuid::now_v7(),
            order_id: selection.order_id().clone(),
            items: selection.items().cloned().collect(),
            reason: reason.to_string(),
            requested_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns::value_objects::ItemId;

    fn item(id: &str) -> OrderItem {
        OrderItem {
            id: ItemId::from(id),
            product_name: format!("Lens {id}"),
            product_image: String::new(),
            quantity: 2,
            rental_days: Some(1),
            return_date: None,
        }
    }

    fn selection_of(ids: &[&str]) -> SelectionSet {
        let mut selection = SelectionSet::new(OrderId::from("O1"));
        for id in ids {
            selection.toggle(&item(id));
        }
        selection
    }

    #[test]
    fn test_build_succeeds_with_items_and_reason() {
        let request = ReturnSubmission::build(&selection_of(&["A", "B"]), "  damaged  ").unwrap();

        assert_eq!(request.order_id().as_str(), "O1");
        assert_eq!(request.item_count(), 2);
        assert_eq!(request.reason(), "damaged");
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let result = ReturnSubmission::build(&selection_of(&[]), "broken");
        assert_eq!(result.unwrap_err(), ValidationError::EmptySelection);
    }

    #[test]
    fn test_whitespace_reason_is_rejected() {
        let result = ReturnSubmission::build(&selection_of(&["A"]), " \t\n ");
        assert_eq!(result.unwrap_err(), ValidationError::EmptyReason);
    }

    #[test]
    fn test_empty_selection_reported_before_empty_reason() {
        let result = ReturnSubmission::build(&selection_of(&[]), "");
        assert_eq!(result.unwrap_err(), ValidationError::EmptySelection);
    }
}

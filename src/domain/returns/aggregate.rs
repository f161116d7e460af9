use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::Aggregate;
use super::commands::ReturnsCommand;
use super::errors::{ReturnsError, ValidationError};
use super::events::*;
use super::selection::SelectionSet;
use super::submission::{ReturnRequest, ReturnSubmission};
use super::value_objects::{ItemId, Order, OrderId, OrderItem};

// ============================================================================
// Return Workflow - State Machine
// ============================================================================
//
// Browsing -> ItemSelection -> ReturnDetail -> Submitting -> Confirmed -> Browsing
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReturnStep {
    Browsing,
    ItemSelection { order_id: OrderId },
    ReturnDetail { order_id: OrderId },
    Submitting { order_id: OrderId },
    Confirmed { order_id: OrderId },
}

impl ReturnStep {
    pub fn name(&self) -> &'static str {
        match self {
            ReturnStep::Browsing => "Browsing",
            ReturnStep::ItemSelection { .. } => "ItemSelection",
            ReturnStep::ReturnDetail { .. } => "ReturnDetail",
            ReturnStep::Submitting { .. } => "Submitting",
            ReturnStep::Confirmed { .. } => "Confirmed",
        }
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            ReturnStep::Browsing => None,
            ReturnStep::ItemSelection { order_id }
            | ReturnStep::ReturnDetail { order_id }
            | ReturnStep::Submitting { order_id }
            | ReturnStep::Confirmed { order_id } => Some(order_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReturnWorkflow {
    // Identity
    pub session_id: Uuid,
    pub version: i64,
    pub user_id: String,

    // Snapshot from the order catalog
    orders: Vec<Order>,

    // Current State (derived from events)
    step: ReturnStep,
    selection: Option<SelectionSet>,
    reason: String,
    in_flight: Option<ReturnRequest>,
}

impl ReturnWorkflow {
    pub fn new(user_id: impl Into<String>, orders: Vec<Order>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            version: 0,
            user_id: user_id.into(),
            orders,
            step: ReturnStep::Browsing,
            selection: None,
            reason: String::new(),
            in_flight: None,
        }
    }

    pub fn step(&self) -> &ReturnStep {
        &self.step
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn selection(&self) -> Option<&SelectionSet> {
        self.selection.as_ref()
    }

    pub fn selection_len(&self) -> usize {
        self.selection.as_ref().map_or(0, SelectionSet::len)
    }

    pub fn in_flight(&self) -> Option<&ReturnRequest> {
        self.in_flight.as_ref()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Orders listed under "Active Orders"
    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status.is_returnable())
    }

    /// Orders listed under "Return History"
    pub fn returned_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| !o.status.is_returnable())
    }

    fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == order_id)
    }

    fn validate_returnable(&self, order_id: &OrderId) -> Result<(), ReturnsError> {
        let order = self
            .order(order_id)
            .ok_or_else(|| ReturnsError::UnknownOrder(order_id.clone()))?;

        if !order.status.is_returnable() {
            return Err(ReturnsError::OrderNotReturnable {
                order_id: order_id.clone(),
                status: order.status,
            });
        }
        Ok(())
    }

    /// Look up an item inside the currently expanded order
    fn expanded_item(&self, item_id: &ItemId) -> Result<&OrderItem, ReturnsError> {
        let order_id = self.step.order_id().ok_or(ReturnsError::InvalidTransition {
            state: self.step.name(),
            command: "ToggleItem",
        })?;

        self.order(order_id)
            .and_then(|order| order.item(item_id))
            .ok_or_else(|| ReturnsError::ItemNotInOrder {
                item_id: item_id.clone(),
                order_id: order_id.clone(),
            })
    }

    fn active_selection(&self, command: &'static str) -> Result<&SelectionSet, ReturnsError> {
        self.selection.as_ref().ok_or(ReturnsError::InvalidTransition {
            state: self.step.name(),
            command,
        })
    }

    fn current_order_id(&self, event: &'static str) -> Result<OrderId, ReturnsError> {
        self.step
            .order_id()
            .cloned()
            .ok_or(ReturnsError::InvalidTransition {
                state: self.step.name(),
                command: event,
            })
    }

    /// The in-flight request, provided `request_id` is the one it answers
    fn answered_request(&self, request_id: Uuid) -> Result<&ReturnRequest, ReturnsError> {
        let request = self.in_flight.as_ref().ok_or(ReturnsError::NoPendingRequest)?;
        if request.request_id() != request_id {
            return Err(ReturnsError::StaleOutcome {
                request_id,
                in_flight: request.request_id(),
            });
        }
        Ok(request)
    }

    fn clear_session_state(&mut self) {
        self.selection = None;
        self.reason.clear();
        self.in_flight = None;
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for ReturnWorkflow {
    type Event = ReturnsEvent;
    type Command = ReturnsCommand;
    type Error = ReturnsError;

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            ReturnsEvent::OrderExpanded(e) => {
                self.clear_session_state();
                self.selection = Some(SelectionSet::new(e.order_id.clone()));
                self.step = ReturnStep::ItemSelection { order_id: e.order_id.clone() };
            }
            ReturnsEvent::OrderCollapsed(_) => {
                self.clear_session_state();
                self.step = ReturnStep::Browsing;
            }
            ReturnsEvent::ItemToggled(e) => {
                let item = self.expanded_item(&e.item_id)?.clone();
                if let Some(selection) = self.selection.as_mut() {
                    selection.toggle(&item);
                }
            }
            ReturnsEvent::DetailOpened(_) => {
                let order_id = self.current_order_id("DetailOpened")?;
                self.step = ReturnStep::ReturnDetail { order_id };
            }
            ReturnsEvent::SelectionResumed(e) => {
                self.step = ReturnStep::ItemSelection { order_id: e.order_id.clone() };
            }
            ReturnsEvent::ReasonUpdated(e) => {
                self.reason = e.reason.clone();
            }
            ReturnsEvent::ValidationFailed(_) => {
                // Guard failure leaves the state untouched
            }
            ReturnsEvent::ReturnSubmitted(e) => {
                self.step = ReturnStep::Submitting { order_id: e.request.order_id().clone() };
                self.in_flight = Some(e.request.clone());
            }
            ReturnsEvent::ReturnAccepted(e) => {
                let accepted_on = e.accepted_at.date_naive();
                if let Some(order) = self.orders.iter_mut().find(|o| o.id == e.order_id) {
                    order.mark_returned(&e.item_ids, accepted_on);
                }
                self.in_flight = None;
                self.step = ReturnStep::Confirmed { order_id: e.order_id.clone() };
            }
            ReturnsEvent::ReturnRejected(_) => {
                let order_id = self.current_order_id("ReturnRejected")?;
                self.in_flight = None;
                self.step = ReturnStep::ReturnDetail { order_id };
            }
            ReturnsEvent::WorkflowReset(_) => {
                self.clear_session_state();
                self.step = ReturnStep::Browsing;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        use ReturnStep as S;
        use ReturnsCommand as C;

        match (&self.step, command) {
            (_, C::Reset) => Ok(vec![ReturnsEvent::WorkflowReset(WorkflowReset {
                cause: ResetCause::NavigatedAway,
            })]),

            (S::Browsing, C::Expand { order_id }) => {
                self.validate_returnable(order_id)?;
                Ok(vec![ReturnsEvent::OrderExpanded(OrderExpanded {
                    order_id: order_id.clone(),
                })])
            }

            (S::ItemSelection { order_id: current }, C::Expand { order_id }) => {
                let collapsed = ReturnsEvent::OrderCollapsed(OrderCollapsed {
                    order_id: current.clone(),
                });

                // Clicking the open order's header closes it
                if current == order_id {
                    return Ok(vec![collapsed]);
                }

                self.validate_returnable(order_id)?;
                Ok(vec![
                    collapsed,
                    ReturnsEvent::OrderExpanded(OrderExpanded {
                        order_id: order_id.clone(),
                    }),
                ])
            }

            (S::ItemSelection { order_id }, C::Collapse) => {
                Ok(vec![ReturnsEvent::OrderCollapsed(OrderCollapsed {
                    order_id: order_id.clone(),
                })])
            }

            (S::ItemSelection { .. } | S::ReturnDetail { .. }, C::ToggleItem { item_id }) => {
                let item = self.expanded_item(item_id)?;
                let selected = !self.active_selection("ToggleItem")?.contains(&item.id);
                Ok(vec![ReturnsEvent::ItemToggled(ItemToggled {
                    item_id: item.id.clone(),
                    selected,
                })])
            }

            (S::ItemSelection { .. }, C::ContinueWithSelection) => {
                let selection = self.active_selection("ContinueWithSelection")?;
                if selection.is_empty() {
                    return Ok(vec![ReturnsEvent::ValidationFailed(ValidationFailed {
                        error: ValidationError::EmptySelection,
                    })]);
                }
                Ok(vec![ReturnsEvent::DetailOpened(DetailOpened {
                    item_count: selection.len(),
                })])
            }

            (S::ReturnDetail { order_id }, C::Back) => {
                Ok(vec![ReturnsEvent::SelectionResumed(SelectionResumed {
                    order_id: order_id.clone(),
                })])
            }

            (S::ReturnDetail { .. }, C::UpdateReason { reason }) => {
                Ok(vec![ReturnsEvent::ReasonUpdated(ReasonUpdated {
                    reason: reason.clone(),
                })])
            }

            (S::ReturnDetail { .. }, C::Submit) => {
                let selection = self.active_selection("Submit")?;
                match ReturnSubmission::build(selection, &self.reason) {
                    Ok(request) => Ok(vec![ReturnsEvent::ReturnSubmitted(ReturnSubmitted { request })]),
                    Err(error) => Ok(vec![ReturnsEvent::ValidationFailed(ValidationFailed { error })]),
                }
            }

            (S::Submitting { .. }, C::SubmissionAccepted { request_id }) => {
                let request = self.answered_request(*request_id)?;
                Ok(vec![ReturnsEvent::ReturnAccepted(ReturnAccepted {
                    request_id: request.request_id(),
                    order_id: request.order_id().clone(),
                    item_ids: request.items().iter().map(|i| i.id.clone()).collect(),
                    accepted_at: chrono::Utc::now(),
                })])
            }

            (S::Submitting { .. }, C::SubmissionRejected { request_id, message }) => {
                let request = self.answered_request(*request_id)?;
                Ok(vec![ReturnsEvent::ReturnRejected(ReturnRejected {
                    request_id: request.request_id(),
                    message: message.clone(),
                })])
            }

            (S::Confirmed { .. }, C::ConfirmationElapsed) => {
                Ok(vec![ReturnsEvent::WorkflowReset(WorkflowReset {
                    cause: ResetCause::ConfirmationElapsed,
                })])
            }

            (S::Confirmed { .. }, C::ContinueShopping) => {
                Ok(vec![ReturnsEvent::WorkflowReset(WorkflowReset {
                    cause: ResetCause::ContinueShopping,
                })])
            }

            (state, command) => Err(ReturnsError::InvalidTransition {
                state: state.name(),
                command: command.name(),
            }),
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.session_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns::value_objects::OrderStatus;
    use chrono::NaiveDate;

    fn item(id: &str) -> OrderItem {
        OrderItem {
            id: ItemId::from(id),
            product_name: format!("Camera {id}"),
            product_image: format!("/img/{id}.jpg"),
            quantity: 1,
            rental_days: Some(2),
            return_date: None,
        }
    }

    fn order(id: &str, status: OrderStatus, items: &[&str]) -> Order {
        Order {
            id: OrderId::from(id),
            order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status,
            items: items.iter().map(|i| item(i)).collect(),
        }
    }

    fn workflow() -> ReturnWorkflow {
        ReturnWorkflow::new(
            "user-1",
            vec![
                order("O1", OrderStatus::Completed, &["A", "B"]),
                order("O2", OrderStatus::Active, &["C"]),
                order("O3", OrderStatus::Returned, &["D"]),
            ],
        )
    }

    fn run(wf: &mut ReturnWorkflow, command: ReturnsCommand) -> Vec<ReturnsEvent> {
        let events = wf.handle_command(&command).unwrap();
        for event in &events {
            wf.apply_event(event).unwrap();
        }
        events
    }

    fn expand(id: &str) -> ReturnsCommand {
        ReturnsCommand::Expand { order_id: OrderId::from(id) }
    }

    fn toggle(id: &str) -> ReturnsCommand {
        ReturnsCommand::ToggleItem { item_id: ItemId::from(id) }
    }

    fn reason(text: &str) -> ReturnsCommand {
        ReturnsCommand::UpdateReason { reason: text.to_string() }
    }

    fn in_flight_id(wf: &ReturnWorkflow) -> Uuid {
        wf.in_flight().unwrap().request_id()
    }

    fn submit_a_b(wf: &mut ReturnWorkflow) {
        run(wf, expand("O1"));
        run(wf, toggle("A"));
        run(wf, toggle("B"));
        run(wf, ReturnsCommand::ContinueWithSelection);
        run(wf, reason("damaged"));
        run(wf, ReturnsCommand::Submit);
    }

    fn validation_error(events: &[ReturnsEvent]) -> Option<ValidationError> {
        events.iter().find_map(|e| match e {
            ReturnsEvent::ValidationFailed(v) => Some(v.error),
            _ => None,
        })
    }

    #[test]
    fn test_initial_state_is_browsing() {
        let wf = workflow();
        assert_eq!(wf.step(), &ReturnStep::Browsing);
        assert_eq!(wf.selection_len(), 0);
        assert_eq!(wf.active_orders().count(), 2);
        assert_eq!(wf.returned_orders().count(), 1);
    }

    #[test]
    fn test_expand_enters_item_selection() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        assert_eq!(wf.step(), &ReturnStep::ItemSelection { order_id: OrderId::from("O1") });
        assert_eq!(wf.selection_len(), 0);
    }

    #[test]
    fn test_expand_returned_order_is_rejected() {
        let wf = workflow();
        let err = wf.handle_command(&expand("O3")).unwrap_err();
        assert!(matches!(err, ReturnsError::OrderNotReturnable { .. }));
    }

    #[test]
    fn test_expand_unknown_order_is_rejected() {
        let wf = workflow();
        let err = wf.handle_command(&expand("nope")).unwrap_err();
        assert!(matches!(err, ReturnsError::UnknownOrder(_)));
    }

    #[test]
    fn test_collapse_returns_to_browsing_and_drops_selection() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));

        let events = run(&mut wf, ReturnsCommand::Collapse);

        assert!(matches!(
            events.as_slice(),
            [ReturnsEvent::OrderCollapsed(e)] if e.order_id == OrderId::from("O1")
        ));
        assert_eq!(wf.step(), &ReturnStep::Browsing);
        assert!(wf.selection().is_none());
        assert_eq!(wf.selection_len(), 0);
    }

    #[test]
    fn test_expanding_open_order_collapses_it() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));

        let events = run(&mut wf, expand("O1"));

        assert_eq!(events.len(), 1);
        assert_eq!(wf.step(), &ReturnStep::Browsing);
        assert!(wf.selection().is_none());
    }

    #[test]
    fn test_expanding_other_order_switches_scope() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));

        let events = run(&mut wf, expand("O2"));

        assert!(matches!(events[0], ReturnsEvent::OrderCollapsed(_)));
        assert!(matches!(events[1], ReturnsEvent::OrderExpanded(_)));
        assert_eq!(wf.step(), &ReturnStep::ItemSelection { order_id: OrderId::from("O2") });
        assert_eq!(wf.selection().unwrap().order_id().as_str(), "O2");
        assert_eq!(wf.selection_len(), 0);
    }

    #[test]
    fn test_toggle_sequence_a_b_a() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));
        run(&mut wf, toggle("B"));
        run(&mut wf, toggle("A"));

        let selection = wf.selection().unwrap();
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&ItemId::from("B")));
    }

    #[test]
    fn test_toggle_item_from_other_order_is_rejected() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        let err = wf.handle_command(&toggle("C")).unwrap_err();
        assert!(matches!(err, ReturnsError::ItemNotInOrder { .. }));
    }

    #[test]
    fn test_continue_without_selection_stays_put() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));

        let events = run(&mut wf, ReturnsCommand::ContinueWithSelection);

        assert_eq!(validation_error(&events), Some(ValidationError::EmptySelection));
        assert_eq!(wf.step(), &ReturnStep::ItemSelection { order_id: OrderId::from("O1") });
    }

    #[test]
    fn test_submit_with_blank_reason_fails() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, reason(" "));

        let events = run(&mut wf, ReturnsCommand::Submit);

        assert_eq!(validation_error(&events), Some(ValidationError::EmptyReason));
        assert_eq!(wf.step(), &ReturnStep::ReturnDetail { order_id: OrderId::from("O1") });
        assert!(wf.in_flight().is_none());
    }

    #[test]
    fn test_deselecting_everything_in_detail_blocks_submit() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, toggle("A"));
        run(&mut wf, reason("broken"));

        let events = run(&mut wf, ReturnsCommand::Submit);
        assert_eq!(validation_error(&events), Some(ValidationError::EmptySelection));
    }

    #[test]
    fn test_back_keeps_selection_and_reason() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("B"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, reason("wrong lens"));

        run(&mut wf, ReturnsCommand::Back);

        assert_eq!(wf.step(), &ReturnStep::ItemSelection { order_id: OrderId::from("O1") });
        assert_eq!(wf.selection_len(), 1);
        assert_eq!(wf.reason(), "wrong lens");
    }

    #[test]
    fn test_full_flow_confirms_then_resets() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));
        run(&mut wf, toggle("B"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, reason("damaged"));
        run(&mut wf, ReturnsCommand::Submit);

        assert_eq!(wf.step(), &ReturnStep::Submitting { order_id: OrderId::from("O1") });
        assert_eq!(wf.in_flight().unwrap().item_count(), 2);

        let request_id = in_flight_id(&wf);
        run(&mut wf, ReturnsCommand::SubmissionAccepted { request_id });
        assert_eq!(wf.step(), &ReturnStep::Confirmed { order_id: OrderId::from("O1") });
        assert_eq!(wf.returned_orders().count(), 2);

        run(&mut wf, ReturnsCommand::ConfirmationElapsed);
        assert_eq!(wf.step(), &ReturnStep::Browsing);
        assert_eq!(wf.selection_len(), 0);
        assert_eq!(wf.reason(), "");
    }

    #[test]
    fn test_rejection_returns_to_detail_with_state_kept() {
        let mut wf = workflow();
        run(&mut wf, expand("O2"));
        run(&mut wf, toggle("C"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, reason("too heavy"));
        run(&mut wf, ReturnsCommand::Submit);

        let request_id = in_flight_id(&wf);
        run(
            &mut wf,
            ReturnsCommand::SubmissionRejected { request_id, message: "service down".to_string() },
        );

        assert_eq!(wf.step(), &ReturnStep::ReturnDetail { order_id: OrderId::from("O2") });
        assert_eq!(wf.selection_len(), 1);
        assert_eq!(wf.reason(), "too heavy");
        assert!(wf.in_flight().is_none());
        assert_eq!(wf.active_orders().count(), 2);
    }

    #[test]
    fn test_outcome_for_abandoned_request_is_refused() {
        let mut wf = workflow();
        submit_a_b(&mut wf);
        let abandoned = in_flight_id(&wf);

        run(&mut wf, ReturnsCommand::Reset);
        submit_a_b(&mut wf);
        let current = in_flight_id(&wf);
        assert_ne!(abandoned, current);

        let err = wf
            .handle_command(&ReturnsCommand::SubmissionAccepted { request_id: abandoned })
            .unwrap_err();
        assert!(matches!(
            err,
            ReturnsError::StaleOutcome { request_id, in_flight }
                if request_id == abandoned && in_flight == current
        ));
        assert_eq!(wf.step(), &ReturnStep::Submitting { order_id: OrderId::from("O1") });
        assert_eq!(wf.returned_orders().count(), 1);

        run(
            &mut wf,
            ReturnsCommand::SubmissionRejected { request_id: current, message: "refused".to_string() },
        );
        assert_eq!(wf.step(), &ReturnStep::ReturnDetail { order_id: OrderId::from("O1") });
        assert!(wf.orders()[0].items.iter().all(|i| i.return_date.is_none()));
    }

    #[test]
    fn test_reset_from_any_state_clears_everything() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, toggle("A"));
        run(&mut wf, ReturnsCommand::ContinueWithSelection);
        run(&mut wf, reason("x"));

        run(&mut wf, ReturnsCommand::Reset);

        assert_eq!(wf.step(), &ReturnStep::Browsing);
        assert!(wf.selection().is_none());
        assert_eq!(wf.reason(), "");
    }

    #[test]
    fn test_commands_outside_their_state_are_invalid() {
        let wf = workflow();
        for command in [
            ReturnsCommand::Submit,
            ReturnsCommand::Back,
            ReturnsCommand::ContinueWithSelection,
            ReturnsCommand::SubmissionAccepted { request_id: Uuid::nil() },
            ReturnsCommand::ConfirmationElapsed,
        ] {
            let err = wf.handle_command(&command).unwrap_err();
            assert!(matches!(err, ReturnsError::InvalidTransition { state: "Browsing", .. }));
        }
    }

    #[test]
    fn test_version_counts_applied_events() {
        let mut wf = workflow();
        run(&mut wf, expand("O1"));
        run(&mut wf, expand("O2"));
        assert_eq!(wf.version(), 3);
    }
}

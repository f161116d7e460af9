use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::effects::{Effect, Notification, TimerKey};
use crate::event_sourcing::{Aggregate, DomainEvent, EventEnvelope, EventJournal};
use crate::metrics::Metrics;

use super::aggregate::{ReturnStep, ReturnWorkflow};
use super::commands::ReturnsCommand;
use super::errors::ReturnsError;
use super::events::{ResetCause, ReturnsEvent};
use super::value_objects::{ItemId, Order};

// ============================================================================
// Returns Command Handler
// ============================================================================
//
// Orchestrates: Command → Workflow → Events → Journal → Effects
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct ReturnsSettings {
    pub confirmation_delay: Duration,
    pub products_route: String,
}

/// Read model handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsView {
    pub session_id: Uuid,
    pub step: ReturnStep,
    pub selected_item_ids: Vec<ItemId>,
    pub reason: String,
    pub active_orders: Vec<Order>,
    pub returned_orders: Vec<Order>,
}

pub struct ReturnsCommandHandler {
    workflow: ReturnWorkflow,
    journal: EventJournal<ReturnsEvent>,
    settings: ReturnsSettings,
    metrics: Arc<Metrics>,
}

impl ReturnsCommandHandler {
    pub fn new(workflow: ReturnWorkflow, settings: ReturnsSettings, metrics: Arc<Metrics>) -> Self {
        Self {
            workflow,
            journal: EventJournal::new(),
            settings,
            metrics,
        }
    }

    pub fn workflow(&self) -> &ReturnWorkflow {
        &self.workflow
    }

    pub fn journal(&self) -> &EventJournal<ReturnsEvent> {
        &self.journal
    }

    /// Handle a command, record the resulting events and return the effects
    /// the caller must run. On error the workflow is left untouched.
    pub fn handle(&mut self, command: ReturnsCommand) -> Result<Vec<Effect>, ReturnsError> {
        let from = self.workflow.step().name();
        let events = self.workflow.handle_command(&command)?;

        let expected_version = self.workflow.version();
        let correlation_id = Uuid::new_v4();
        let mut next = self.workflow.clone();
        let mut envelopes = Vec::with_capacity(events.len());
        let mut effects = Vec::new();

        for event in events {
            next.apply_event(&event)?;
            self.record_metrics(&event);
            effects.extend(self.effects_for(&event));

            let envelope = EventEnvelope::new(
                next.aggregate_id(),
                next.version(),
                event.event_type(),
                event,
                correlation_id,
            )
            .with_user(next.user_id.clone())
            .with_metadata("command", command.name());

            envelopes.push(envelope);
        }

        self.journal.append_events(expected_version, envelopes)?;
        self.workflow = next;

        let to = self.workflow.step().name();
        if from != to {
            self.metrics.record_transition(from, to);
        }

        tracing::debug!(
            session_id = %self.workflow.session_id,
            command = command.name(),
            from = from,
            to = to,
            effect_count = effects.len(),
            "Returns command handled"
        );

        Ok(effects)
    }

    fn effects_for(&self, event: &ReturnsEvent) -> Vec<Effect> {
        match event {
            ReturnsEvent::ValidationFailed(e) => vec![Effect::Notify(Notification::destructive(
                e.error.title(),
                e.error.description(),
            ))],
            ReturnsEvent::ReturnSubmitted(e) => vec![Effect::SubmitReturn(e.request.clone())],
            ReturnsEvent::ReturnAccepted(e) => vec![
                Effect::Notify(Notification::info(
                    "Return requested",
                    format!(
                        "{} item(s) return requested successfully. Our team will contact you shortly.",
                        e.item_ids.len()
                    ),
                )),
                Effect::ScheduleTimer {
                    timer: TimerKey::ReturnConfirmation,
                    delay: self.settings.confirmation_delay,
                },
            ],
            ReturnsEvent::ReturnRejected(e) => vec![Effect::Notify(Notification::destructive(
                "Return request failed",
                e.message.clone(),
            ))],
            ReturnsEvent::WorkflowReset(e) => match e.cause {
                ResetCause::ConfirmationElapsed => vec![],
                ResetCause::ContinueShopping => vec![
                    Effect::CancelTimer(TimerKey::ReturnConfirmation),
                    Effect::Navigate(self.settings.products_route.clone()),
                ],
                ResetCause::NavigatedAway => vec![Effect::CancelTimer(TimerKey::ReturnConfirmation)],
            },
            _ => vec![],
        }
    }

    fn record_metrics(&self, event: &ReturnsEvent) {
        match event {
            ReturnsEvent::ValidationFailed(e) => {
                tracing::info!(kind = e.error.kind(), "Return validation failed");
                self.metrics.record_validation_failure(e.error.kind());
            }
            ReturnsEvent::ReturnSubmitted(e) => {
                tracing::info!(
                    request_id = %e.request.request_id(),
                    order_id = %e.request.order_id(),
                    item_count = e.request.item_count(),
                    requested_at = %e.request.requested_at(),
                    "Return request submitted"
                );
                self.metrics.record_return_submitted();
            }
            ReturnsEvent::ReturnAccepted(e) => {
                tracing::info!(request_id = %e.request_id, order_id = %e.order_id, "✅ Return request accepted");
                self.metrics.record_return_outcome(true);
            }
            ReturnsEvent::ReturnRejected(e) => {
                tracing::warn!(request_id = %e.request_id, message = %e.message, "Return request rejected");
                self.metrics.record_return_outcome(false);
            }
            _ => {}
        }
    }

    pub fn view(&self) -> ReturnsView {
        let wf = &self.workflow;
        ReturnsView {
            session_id: wf.session_id,
            step: wf.step().clone(),
            selected_item_ids: wf
                .selection()
                .map(|s| s.item_ids().cloned().collect())
                .unwrap_or_default(),
            reason: wf.reason().to_string(),
            active_orders: wf.active_orders().cloned().collect(),
            returned_orders: wf.returned_orders().cloned().collect(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

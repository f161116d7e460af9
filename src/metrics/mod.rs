// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Return workflow transitions and validation failures
// - Return submissions and their outcome
// - Cart additions and image load failures
// - Deferred timers (scheduled, fired, cancelled)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for a storefront process
pub struct Metrics {
    registry: Registry,

    // Returns Workflow Metrics
    pub returns_transitions: IntCounterVec,
    pub returns_validation_failures: IntCounterVec,
    pub returns_submitted: IntCounter,
    pub returns_accepted: IntCounter,
    pub returns_rejected: IntCounter,

    // Catalog Metrics
    pub cart_additions: IntCounter,
    pub image_load_failures: IntCounter,

    // Timer Metrics
    pub timer_events: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Returns Workflow Metrics
        let returns_transitions = IntCounterVec::new(
            Opts::new("returns_transitions_total", "Return workflow state transitions"),
            &["from_state", "to_state"],
        )?;
        registry.register(Box::new(returns_transitions.clone()))?;

        let returns_validation_failures = IntCounterVec::new(
            Opts::new("returns_validation_failures_total", "Return commands rejected by validation"),
            &["kind"],
        )?;
        registry.register(Box::new(returns_validation_failures.clone()))?;

        let returns_submitted = IntCounter::new(
            "returns_submitted_total",
            "Return requests handed to the order service",
        )?;
        registry.register(Box::new(returns_submitted.clone()))?;

        let returns_accepted = IntCounter::new(
            "returns_accepted_total",
            "Return requests accepted by the order service",
        )?;
        registry.register(Box::new(returns_accepted.clone()))?;

        let returns_rejected = IntCounter::new(
            "returns_rejected_total",
            "Return requests rejected by the order service",
        )?;
        registry.register(Box::new(returns_rejected.clone()))?;

        // Catalog Metrics
        let cart_additions = IntCounter::new("cart_additions_total", "Products committed to the cart")?;
        registry.register(Box::new(cart_additions.clone()))?;

        let image_load_failures = IntCounter::new(
            "image_load_failures_total",
            "Product images that failed to load",
        )?;
        registry.register(Box::new(image_load_failures.clone()))?;

        // Timer Metrics
        let timer_events = IntCounterVec::new(
            Opts::new("session_timer_events_total", "Deferred session timers by outcome"),
            &["timer", "outcome"],
        )?;
        registry.register(Box::new(timer_events.clone()))?;

        Ok(Self {
            registry,
            returns_transitions,
            returns_validation_failures,
            returns_submitted,
            returns_accepted,
            returns_rejected,
            cart_additions,
            image_load_failures,
            timer_events,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transition(&self, from_state: &str, to_state: &str) {
        self.returns_transitions.with_label_values(&[from_state, to_state]).inc();
    }

    pub fn record_validation_failure(&self, kind: &str) {
        self.returns_validation_failures.with_label_values(&[kind]).inc();
    }

    pub fn record_return_submitted(&self) {
        self.returns_submitted.inc();
    }

    pub fn record_return_outcome(&self, accepted: bool) {
        if accepted {
            self.returns_accepted.inc();
        } else {
            self.returns_rejected.inc();
        }
    }

    pub fn record_cart_addition(&self) {
        self.cart_additions.inc();
    }

    pub fn record_image_failure(&self) {
        self.image_load_failures.inc();
    }

    /// outcome is one of "scheduled", "fired", "cancelled"
    pub fn record_timer(&self, timer: &str, outcome: &str) {
        self.timer_events.with_label_values(&[timer, outcome]).inc();
    }
}

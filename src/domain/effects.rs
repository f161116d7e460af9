use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::catalog::{Product, ProductId};
use super::returns::ReturnRequest;

// ============================================================================
// Effects - side effects requested by state transitions
// ============================================================================
//
// State machines return effects as data; the session executes them against
// the external collaborators.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Identifies a deferred callback so it can be replaced or cancelled
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    ReturnConfirmation,
    AddToCart(ProductId),
}

impl TimerKey {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            TimerKey::ReturnConfirmation => "return_confirmation",
            TimerKey::AddToCart(_) => "add_to_cart",
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKey::ReturnConfirmation => f.write_str("return_confirmation"),
            TimerKey::AddToCart(product_id) => write!(f, "add_to_cart:{product_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    Navigate(String),
    SubmitReturn(ReturnRequest),
    ScheduleTimer { timer: TimerKey, delay: Duration },
    CancelTimer(TimerKey),
    AddToCart { product: Product, quantity: u32, days: u32 },
}

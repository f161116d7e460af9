use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::catalog::{Product, ProductId};
use crate::domain::effects::{Notification, Severity};
use crate::domain::returns::{Order, ReturnRequest, User};
use super::ports::*;

// ============================================================================
// In-Memory Collaborators
// ============================================================================
//
// Used by the demo binary and the tests. Each one records what it was asked
// to do so callers can inspect it afterwards.
//
// ============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Order catalog and order service backed by a map of user id -> orders
#[derive(Default)]
pub struct InMemoryOrders {
    orders: Mutex<HashMap<String, Vec<Order>>>,
    submitted: Mutex<Vec<ReturnRequest>>,
    reject_with: Mutex<Option<String>>,
    unavailable_loads: AtomicU32,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(self, user_id: impl Into<String>, orders: Vec<Order>) -> Self {
        lock(&self.orders).insert(user_id.into(), orders);
        self
    }

    /// Reject every following return submission with `message`
    pub fn reject_returns(&self, message: impl Into<String>) {
        *lock(&self.reject_with) = Some(message.into());
    }

    /// Report the catalog as unavailable for the next `count` loads
    pub fn fail_next_loads(&self, count: u32) {
        self.unavailable_loads.store(count, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<ReturnRequest> {
        lock(&self.submitted).clone()
    }
}

#[async_trait]
impl OrderCatalog for InMemoryOrders {
    async fn get_user_orders(&self, user_id: &str) -> Result<Vec<Order>, ServiceError> {
        let pending_failures = self.unavailable_loads.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.unavailable_loads.store(pending_failures - 1, Ordering::SeqCst);
            return Err(ServiceError::Unavailable("order catalog warming up".to_string()));
        }

        Ok(lock(&self.orders).get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OrderService for InMemoryOrders {
    async fn submit_return(&self, request: ReturnRequest) -> Result<(), ServiceError> {
        if let Some(message) = lock(&self.reject_with).clone() {
            return Err(ServiceError::Rejected(message));
        }

        tracing::info!(
            request_id = %request.request_id(),
            order_id = %request.order_id(),
            item_count = request.item_count(),
            "Return request recorded"
        );
        lock(&self.submitted).push(request);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub days: u32,
}

#[derive(Default)]
pub struct InMemoryCart {
    lines: Mutex<Vec<CartLine>>,
}

impl InMemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        lock(&self.lines).clone()
    }
}

impl CartService for InMemoryCart {
    fn add_to_cart(&self, product: &Product, quantity: u32, days: u32) {
        tracing::debug!(product_id = %product.id, quantity, days, "Cart line added");
        lock(&self.lines).push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            days,
        });
    }
}

/// Logs every notification and keeps a copy
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.severity {
            Severity::Info => tracing::info!(
                title = %notification.title,
                "🔔 {}", notification.description
            ),
            Severity::Destructive => tracing::warn!(
                title = %notification.title,
                "🔔 {}", notification.description
            ),
        }
        lock(&self.sent).push(notification.clone());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        tracing::info!(path = %path, "Navigating");
        lock(&self.visited).push(path.to_string());
    }
}

pub struct StaticSession {
    user: Option<User>,
}

impl StaticSession {
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }
}

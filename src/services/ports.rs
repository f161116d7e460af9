use async_trait::async_trait;

use crate::domain::catalog::Product;
use crate::domain::effects::Notification;
use crate::domain::returns::{Order, ReturnRequest, User};
use crate::utils::IsTransient;

// ============================================================================
// Collaborator Ports
// ============================================================================
//
// Everything the storefront core needs from the outside world. Remote
// collaborators are async; UI-local ones are plain calls.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl IsTransient for ServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Unavailable(_))
    }
}

/// Order history for the signed-in customer (read-only)
#[async_trait]
pub trait OrderCatalog: Send + Sync {
    async fn get_user_orders(&self, user_id: &str) -> Result<Vec<Order>, ServiceError>;
}

/// Receives validated return requests
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn submit_return(&self, request: ReturnRequest) -> Result<(), ServiceError>;
}

pub trait CartService: Send + Sync {
    fn add_to_cart(&self, product: &Product, quantity: u32, days: u32);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;
}

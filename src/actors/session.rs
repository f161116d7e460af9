use actix::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StorefrontConfig;
use crate::domain::catalog::{Product, ProductCard, ProductCardView, ProductId};
use crate::domain::effects::{Effect, TimerKey};
use crate::domain::returns::{
    ReturnRequest, ReturnWorkflow, ReturnsCommand, ReturnsCommandHandler, ReturnsError,
    ReturnsSettings, ReturnsView,
};
use crate::metrics::Metrics;
use crate::services::{
    CartService, Navigator, Notifier, OrderCatalog, OrderService, ServiceError, SessionProvider,
};
use crate::utils::{retry_on_transient, RetryConfig};

use super::core::TimerRegistry;

// ============================================================================
// Storefront Session Actor
// ============================================================================
//
// One logical customer session. Messages run to completion one at a time, so
// the workflow, the product cards and the timers need no locking.
//
// Responsibilities:
// - Route commands into the returns workflow and run the resulting effects
// - Drive add-to-cart and return-confirmation timers (cancellable)
// - Cancel every pending timer when the session stops
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Returns page is not open")]
    ReturnsNotOpen,

    #[error("Could not load orders: {0}")]
    Catalog(#[from] ServiceError),

    #[error(transparent)]
    Returns(#[from] ReturnsError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum ReturnsPage {
    LoginRequired { login_path: String },
    Ready(ReturnsView),
}

/// External collaborators the session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn OrderCatalog>,
    pub orders: Arc<dyn OrderService>,
    pub cart: Arc<dyn CartService>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub session: Arc<dyn SessionProvider>,
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<ReturnsPage, SessionError>")]
pub struct OpenReturns;

#[derive(Message)]
#[rtype(result = "Result<ReturnsView, SessionError>")]
pub struct Dispatch(pub ReturnsCommand);

#[derive(Message)]
#[rtype(result = "Option<ReturnsView>")]
pub struct GetReturnsView;

/// Journal of the open returns workflow as JSON lines
#[derive(Message)]
#[rtype(result = "Option<String>")]
pub struct ExportJournal;

/// Returns false when an add for the same product is already in flight
#[derive(Message)]
#[rtype(result = "bool")]
pub struct AddToCart {
    pub product: Product,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct ReportImage {
    pub product: Product,
    pub loaded: bool,
}

#[derive(Message)]
#[rtype(result = "Option<ProductCardView>")]
pub struct GetCard {
    pub product_id: ProductId,
}

#[derive(Message)]
#[rtype(result = "usize")]
pub struct PendingTimers;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Teardown;

// ============================================================================
// Actor
// ============================================================================

pub struct StorefrontSession {
    config: Arc<StorefrontConfig>,
    collaborators: Collaborators,
    metrics: Arc<Metrics>,
    returns: Option<ReturnsCommandHandler>,
    cards: HashMap<ProductId, ProductCard>,
    timers: TimerRegistry<TimerKey, SpawnHandle>,
}

impl StorefrontSession {
    pub fn new(config: Arc<StorefrontConfig>, collaborators: Collaborators, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            collaborators,
            metrics,
            returns: None,
            cards: HashMap::new(),
            timers: TimerRegistry::new(),
        }
    }

    fn returns_settings(&self) -> ReturnsSettings {
        ReturnsSettings {
            confirmation_delay: self.config.timings.confirmation_delay(),
            products_route: self.config.routes.products.clone(),
        }
    }

    fn dispatch(&mut self, command: ReturnsCommand, ctx: &mut Context<Self>) -> Result<(), SessionError> {
        let handler = self.returns.as_mut().ok_or(SessionError::ReturnsNotOpen)?;
        let effects = handler.handle(command)?;
        self.run_effects(effects, ctx);
        Ok(())
    }

    fn run_effects(&mut self, effects: Vec<Effect>, ctx: &mut Context<Self>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.collaborators.notifier.notify(&notification),
                Effect::Navigate(path) => self.collaborators.navigator.navigate_to(&path),
                Effect::SubmitReturn(request) => self.submit_return(request, ctx),
                Effect::ScheduleTimer { timer, delay } => self.schedule_timer(timer, delay, ctx),
                Effect::CancelTimer(timer) => self.cancel_timer(&timer, ctx),
                Effect::AddToCart { product, quantity, days } => {
                    self.collaborators.cart.add_to_cart(&product, quantity, days);
                    self.metrics.record_cart_addition();
                }
            }
        }
    }

    /// Hand the request to the order service; its answer comes back as a
    /// workflow command
    fn submit_return(&mut self, request: ReturnRequest, ctx: &mut Context<Self>) {
        let orders = self.collaborators.orders.clone();
        let request_id = request.request_id();
        let submission = async move { orders.submit_return(request).await };

        ctx.spawn(submission.into_actor(self).map(move |result, act, ctx| {
            let command = match result {
                Ok(()) => ReturnsCommand::SubmissionAccepted { request_id },
                Err(e) => ReturnsCommand::SubmissionRejected {
                    request_id,
                    message: e.to_string(),
                },
            };

            if let Err(e) = act.dispatch(command, ctx) {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Dropping outcome of a request the workflow no longer waits for"
                );
            }
        }));
    }

    fn schedule_timer(&mut self, timer: TimerKey, delay: Duration, ctx: &mut Context<Self>) {
        let key = timer.clone();
        let handle = ctx.run_later(delay, move |act, ctx| act.on_timer(key, ctx));

        tracing::debug!(timer = %timer, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        self.metrics.record_timer(timer.label(), "scheduled");

        if let Some(previous) = self.timers.track(timer, handle) {
            ctx.cancel_future(previous);
        }
    }

    fn cancel_timer(&mut self, timer: &TimerKey, ctx: &mut Context<Self>) {
        if let Some(handle) = self.timers.release(timer) {
            ctx.cancel_future(handle);
            tracing::debug!(timer = %timer, "Timer cancelled");
            self.metrics.record_timer(timer.label(), "cancelled");
        }
    }

    fn on_timer(&mut self, timer: TimerKey, ctx: &mut Context<Self>) {
        self.timers.release(&timer);
        self.metrics.record_timer(timer.label(), "fired");

        match timer {
            TimerKey::ReturnConfirmation => {
                if let Err(e) = self.dispatch(ReturnsCommand::ConfirmationElapsed, ctx) {
                    tracing::warn!(error = %e, "Confirmation timer fired outside the confirmed state");
                }
            }
            TimerKey::AddToCart(product_id) => {
                let effects = match self.cards.get_mut(&product_id) {
                    Some(card) => card.complete_add(),
                    None => Vec::new(),
                };
                self.run_effects(effects, ctx);
            }
        }
    }
}

impl Actor for StorefrontSession {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("🛒 StorefrontSession started");
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        let pending = self.timers.drain();
        for handle in &pending {
            ctx.cancel_future(*handle);
        }

        tracing::info!(cancelled_timers = pending.len(), "🛑 StorefrontSession stopping");
        Running::Stop
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<OpenReturns> for StorefrontSession {
    type Result = ResponseActFuture<Self, Result<ReturnsPage, SessionError>>;

    fn handle(&mut self, _msg: OpenReturns, _ctx: &mut Self::Context) -> Self::Result {
        let Some(user) = self.collaborators.session.current_user() else {
            tracing::info!("No signed-in user, showing login prompt");
            let page = ReturnsPage::LoginRequired {
                login_path: self.config.routes.login.clone(),
            };
            return Box::pin(actix::fut::ready(Ok(page)));
        };

        let catalog = self.collaborators.catalog.clone();
        let retry = RetryConfig::from(&self.config.catalog.retry);
        let user_id = user.id.clone();

        let load = async move {
            retry_on_transient(retry, "load_orders", |_attempt| {
                let catalog = catalog.clone();
                let user_id = user_id.clone();
                async move { catalog.get_user_orders(&user_id).await }
            })
            .await
            .into_result()
        };

        Box::pin(load.into_actor(self).map(
            move |result, act, ctx| -> Result<ReturnsPage, SessionError> {
                let orders = result?;
                tracing::info!(user_id = %user.id, order_count = orders.len(), "Returns page opened");

                // Reopening starts over
                act.cancel_timer(&TimerKey::ReturnConfirmation, ctx);

                let handler = ReturnsCommandHandler::new(
                    ReturnWorkflow::new(user.id.clone(), orders),
                    act.returns_settings(),
                    act.metrics.clone(),
                );
                let view = handler.view();
                act.returns = Some(handler);
                Ok(ReturnsPage::Ready(view))
            },
        ))
    }
}

impl Handler<Dispatch> for StorefrontSession {
    type Result = Result<ReturnsView, SessionError>;

    fn handle(&mut self, msg: Dispatch, ctx: &mut Self::Context) -> Self::Result {
        self.dispatch(msg.0, ctx)?;
        self.returns
            .as_ref()
            .map(ReturnsCommandHandler::view)
            .ok_or(SessionError::ReturnsNotOpen)
    }
}

impl Handler<GetReturnsView> for StorefrontSession {
    type Result = Option<ReturnsView>;

    fn handle(&mut self, _msg: GetReturnsView, _ctx: &mut Self::Context) -> Self::Result {
        self.returns.as_ref().map(ReturnsCommandHandler::view)
    }
}

impl Handler<ExportJournal> for StorefrontSession {
    type Result = Option<String>;

    fn handle(&mut self, _msg: ExportJournal, _ctx: &mut Self::Context) -> Self::Result {
        let handler = self.returns.as_ref()?;
        match handler.journal().to_json_lines() {
            Ok(lines) => Some(lines),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize returns journal");
                None
            }
        }
    }
}

impl Handler<AddToCart> for StorefrontSession {
    type Result = bool;

    fn handle(&mut self, msg: AddToCart, ctx: &mut Self::Context) -> Self::Result {
        let delay = self.config.timings.add_to_cart_delay();
        let product = msg.product;
        let card = self
            .cards
            .entry(product.id.clone())
            .or_insert_with(|| ProductCard::new(product));

        let effects = card.press_add(delay);
        let accepted = !effects.is_empty();
        self.run_effects(effects, ctx);
        accepted
    }
}

impl Handler<ReportImage> for StorefrontSession {
    type Result = ();

    fn handle(&mut self, msg: ReportImage, _ctx: &mut Self::Context) -> Self::Result {
        let product = msg.product;
        let card = self
            .cards
            .entry(product.id.clone())
            .or_insert_with(|| ProductCard::new(product));

        if msg.loaded {
            card.image_loaded();
        } else {
            card.image_failed();
            self.metrics.record_image_failure();
        }
    }
}

impl Handler<GetCard> for StorefrontSession {
    type Result = Option<ProductCardView>;

    fn handle(&mut self, msg: GetCard, _ctx: &mut Self::Context) -> Self::Result {
        let currency = &self.config.catalog.currency_symbol;
        self.cards.get(&msg.product_id).map(|card| card.view(currency))
    }
}

impl Handler<PendingTimers> for StorefrontSession {
    type Result = usize;

    fn handle(&mut self, _msg: PendingTimers, _ctx: &mut Self::Context) -> Self::Result {
        self.timers.len()
    }
}

impl Handler<Teardown> for StorefrontSession {
    type Result = ();

    fn handle(&mut self, _msg: Teardown, ctx: &mut Self::Context) -> Self::Result {
        tracing::info!("Session teardown requested");
        ctx.stop();
    }
}

// ============================================================================
// Tests
// ============================================================================

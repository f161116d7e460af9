use actix::prelude::*;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront::actors::{
    AddToCart, Collaborators, Dispatch, ExportJournal, OpenReturns, ReportImage, ReturnsPage,
    StorefrontSession, Teardown,
};
use storefront::config::StorefrontConfig;
use storefront::domain::catalog::{Product, ProductCategory, ProductId};
use storefront::domain::returns::{
    ItemId, Order, OrderId, OrderItem, OrderStatus, ReturnsCommand, User,
};
use storefront::metrics::{self, Metrics};
use storefront::services::{
    InMemoryCart, InMemoryOrders, RecordingNavigator, RecordingNotifier, StaticSession,
};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = StorefrontConfig::load()?;

    // Structured logging; RUST_LOG overrides the configured filter
    // Example: RUST_LOG=storefront=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter.0)),
        )
        .init();

    tracing::info!("🚀 Starting storefront session demo");

    // === 1. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    if config.metrics.enabled {
        let registry = Arc::new(metrics.registry().clone());
        let port = config.metrics.port;
        actix::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(registry, port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 2. Seed in-memory collaborators ===
    let user = User {
        id: "user-42".to_string(),
        name: "Meera Iyer".to_string(),
        email: "meera@example.com".to_string(),
    };
    let orders = Arc::new(InMemoryOrders::new().with_orders(user.id.clone(), seed_orders()));
    let cart = Arc::new(InMemoryCart::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let collaborators = Collaborators {
        catalog: orders.clone(),
        orders: orders.clone(),
        cart: cart.clone(),
        notifier: notifier.clone(),
        navigator: Arc::new(RecordingNavigator::new()),
        session: Arc::new(StaticSession::signed_in(user)),
    };

    let confirmation_delay = config.timings.confirmation_delay();
    let add_to_cart_delay = config.timings.add_to_cart_delay();
    let session = StorefrontSession::new(Arc::new(config), collaborators, metrics.clone()).start();

    // === 3. Walk through a return ===
    match session.send(OpenReturns).await?? {
        ReturnsPage::Ready(view) => tracing::info!(
            active = view.active_orders.len(),
            returned = view.returned_orders.len(),
            "📦 Returns page ready"
        ),
        ReturnsPage::LoginRequired { login_path } => {
            tracing::warn!("Not signed in, redirecting to {}", login_path);
            return Ok(());
        }
    }

    let commands = vec![
        ReturnsCommand::Expand { order_id: OrderId::from("ORD-1001") },
        ReturnsCommand::ToggleItem { item_id: ItemId::from("ITM-1") },
        ReturnsCommand::ContinueWithSelection,
        ReturnsCommand::UpdateReason { reason: "   ".to_string() },
        ReturnsCommand::Submit,
        ReturnsCommand::UpdateReason { reason: "Shutter sticks at 1/8000".to_string() },
        ReturnsCommand::Submit,
    ];

    for command in commands {
        let name = command.name();
        let view = session.send(Dispatch(command)).await??;
        tracing::info!(command = name, step = view.step.name(), "✅ Command handled");
    }

    tokio::time::sleep(confirmation_delay + std::time::Duration::from_millis(200)).await;

    if let Some(journal) = session.send(ExportJournal).await? {
        tracing::debug!("Returns journal:\n{}", journal);
    }

    // === 4. Add a product to the cart ===
    let product = seed_product();
    session.send(ReportImage { product: product.clone(), loaded: true }).await?;
    session.send(AddToCart { product: product.clone() }).await?;
    let accepted = session.send(AddToCart { product }).await?;
    tracing::info!(accepted, "Second press while adding");

    tokio::time::sleep(add_to_cart_delay + std::time::Duration::from_millis(100)).await;

    tracing::info!(
        cart_lines = cart.lines().len(),
        notifications = notifier.notifications().len(),
        returns_submitted = orders.submitted().len(),
        "🧾 Session summary"
    );

    session.do_send(Teardown);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    tracing::info!("🎉 Demo complete!");

    Ok(())
}

fn seed_orders() -> Vec<Order> {
    let item = |id: &str, name: &str, days| OrderItem {
        id: ItemId::from(id),
        product_name: name.to_string(),
        product_image: format!("/images/{}.jpg", id.to_lowercase()),
        quantity: 1,
        rental_days: Some(days),
        return_date: None,
    };

    vec![
        Order {
            id: OrderId::from("ORD-1001"),
            order_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap_or_default(),
            status: OrderStatus::Completed,
            items: vec![item("ITM-1", "Sony A7 IV", 3), item("ITM-2", "Sigma 24-70mm f/2.8", 3)],
        },
        Order {
            id: OrderId::from("ORD-0990"),
            order_date: NaiveDate::from_ymd_opt(2024, 5, 18).unwrap_or_default(),
            status: OrderStatus::Returned,
            items: vec![item("ITM-7", "Aputure 300d", 2)],
        },
    ]
}

fn seed_product() -> Product {
    Product {
        id: ProductId::from("PRD-RS3"),
        name: "DJI RS 3 Pro".to_string(),
        description: "3-axis gimbal stabilizer".to_string(),
        category: ProductCategory::Accessories,
        price: 1200,
        stock: 5,
        image: "/images/rs3.jpg".to_string(),
    }
}

use std::time::Duration;

use serde::Serialize;

use crate::domain::effects::{Effect, Notification, TimerKey};
use super::value_objects::{Product, ProductId};

// ============================================================================
// Product Card - state behind a single catalog tile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    Loading,
    Loaded,
    /// Broken-image placeholder; the loader is hidden all the same
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::OutOfStock => "Out of Stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCardView {
    pub product_id: ProductId,
    pub name: String,
    pub category_label: String,
    pub price_display: String,
    pub availability: Availability,
    pub image: ImageState,
    pub show_loader: bool,
    pub adding: bool,
}

#[derive(Debug, Clone)]
pub struct ProductCard {
    product: Product,
    image: ImageState,
    adding: bool,
}

impl ProductCard {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            image: ImageState::Loading,
            adding: false,
        }
    }

    pub fn price_display(&self, currency: &str) -> String {
        if self.product.category.is_package() {
            format!("{currency}{} (full package)", self.product.price)
        } else {
            format!("{currency}{}/day", self.product.price)
        }
    }

    pub fn category_label(&self) -> String {
        let name = self.product.category.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn availability(&self) -> Availability {
        if self.product.stock > 0 {
            Availability::InStock
        } else {
            Availability::OutOfStock
        }
    }

    pub fn image_loaded(&mut self) {
        self.image = ImageState::Loaded;
    }

    pub fn image_failed(&mut self) {
        tracing::warn!(product_id = %self.product.id, "Failed to load image for {}", self.product.name);
        self.image = ImageState::Failed;
    }

    /// Start the add-to-cart animation. The cart is only touched once the
    /// timer fires; presses during the animation are ignored.
    pub fn press_add(&mut self, delay: Duration) -> Vec<Effect> {
        if self.adding {
            tracing::debug!(product_id = %self.product.id, "Add to cart already in flight");
            return vec![];
        }

        self.adding = true;
        vec![Effect::ScheduleTimer {
            timer: TimerKey::AddToCart(self.product.id.clone()),
            delay,
        }]
    }

    pub fn complete_add(&mut self) -> Vec<Effect> {
        if !self.adding {
            return vec![];
        }

        self.adding = false;
        vec![
            Effect::AddToCart {
                product: self.product.clone(),
                quantity: 1,
                days: 1,
            },
            Effect::Notify(Notification::info(
                "Added to cart",
                format!("{} has been added to your cart.", self.product.name),
            )),
        ]
    }

    pub fn view(&self, currency: &str) -> ProductCardView {
        ProductCardView {
            product_id: self.product.id.clone(),
            name: self.product.name.clone(),
            category_label: self.category_label(),
            price_display: self.price_display(currency),
            availability: self.availability(),
            image: self.image,
            show_loader: self.image == ImageState::Loading,
            adding: self.adding,
        }
    }
}

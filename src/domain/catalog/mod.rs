// ============================================================================
// Catalog Domain - Product tiles
// ============================================================================

pub mod value_objects;
pub mod product_card;

pub use value_objects::*;
pub use product_card::*;

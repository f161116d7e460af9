use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog Value Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Camera,
    Lens,
    Lighting,
    Audio,
    Accessories,
    Editing,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Camera => "camera",
            ProductCategory::Lens => "lens",
            ProductCategory::Lighting => "lighting",
            ProductCategory::Audio => "audio",
            ProductCategory::Accessories => "accessories",
            ProductCategory::Editing => "editing",
        }
    }

    /// Editing services are sold as a package, everything else is rented per day
    pub fn is_package(&self) -> bool {
        matches!(self, ProductCategory::Editing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    /// Whole rupees
    pub price: u32,
    pub stock: u32,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&ProductCategory::Lighting).unwrap();
        assert_eq!(json, "\"lighting\"");

        let category: ProductCategory = serde_json::from_str("\"editing\"").unwrap();
        assert!(category.is_package());
    }

    #[test]
    fn test_product_deserialization() {
        let json = r#"{
            "id": "p-1",
            "name": "Godox SL60W",
            "description": "LED video light",
            "category": "lighting",
            "price": 450,
            "stock": 3,
            "image": "/images/sl60w.jpg"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p-1");
        assert_eq!(product.category, ProductCategory::Lighting);
        assert!(!product.category.is_package());
    }
}

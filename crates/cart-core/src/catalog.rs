//! # Catalog Types
//!
//! Read-only catalog data owned by a separate subsystem.
//! Items are loaded from `config/catalog.toml`.

use serde::{Deserialize, Serialize};

/// An item in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique item identifier (e.g., "vinyl-classic")
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in the gateway's currency unit
    pub price: f64,

    /// Category for storefront grouping
    #[serde(default)]
    pub category: String,

    /// Optional image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Whether this item is available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl CatalogItem {
    /// Create an item with required fields
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: String::new(),
            image_url: None,
            active: true,
        }
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Item catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item to the catalog
    pub fn add(&mut self, item: CatalogItem) {
        self.items.push(item);
    }

    /// Find an item by ID
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Get all active items
    pub fn active_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|i| i.active)
    }

    /// Load catalog from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

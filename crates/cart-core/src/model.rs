//! # Cart Data Model
//!
//! Persisted cart and cart-item records, plus the read-only user reference
//! supplied by the auth layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Mutable cart, accepting items (the user's single active cart)
    Adding,
    /// Submitted to the gateway, awaiting confirmation
    Check,
    /// Terminal: the gateway reported the cart's code as settled
    Confirmed,
}

impl CartStatus {
    /// Stable string form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Adding => "adding",
            CartStatus::Check => "check",
            CartStatus::Confirmed => "confirmed",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "adding" => Some(CartStatus::Adding),
            "check" => Some(CartStatus::Check),
            "confirmed" => Some(CartStatus::Confirmed),
            _ => None,
        }
    }
}

impl Default for CartStatus {
    fn default() -> Self {
        CartStatus::Adding
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted cart
///
/// At most one cart per user is ever in `Adding` status; the store layer
/// enforces this with a uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Unique cart ID
    pub id: Uuid,

    /// Owning user
    pub user_id: i64,

    /// Lifecycle status
    pub status: CartStatus,

    /// Gateway-assigned checkout code; empty until checkout succeeds
    #[serde(default)]
    pub unique_code: String,

    /// Payment network/currency selector
    pub chain: i32,

    /// Created timestamp (order-history sorts newest first)
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Create a fresh active cart for a user
    pub fn new(user_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: CartStatus::Adding,
            unique_code: String::new(),
            chain: 0,
            created_at: Utc::now(),
        }
    }

    /// Whether the cart is still accepting items
    pub fn is_active(&self) -> bool {
        self.status == CartStatus::Adding
    }

    /// Whether the cart has been registered with the gateway
    pub fn has_code(&self) -> bool {
        !self.unique_code.is_empty()
    }
}

/// A line in a cart, referencing a catalog item
///
/// Created on add-to-cart and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique cart-item ID
    pub id: Uuid,

    /// Owning cart
    pub cart_id: Uuid,

    /// Referenced catalog item
    pub item_id: String,
}

impl CartItem {
    /// Create a cart item linking a cart and a catalog item
    pub fn new(cart_id: Uuid, item_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cart_id,
            item_id: item_id.into(),
        }
    }
}

/// The authenticated user as seen by this core: identity and billing email.
/// Supplied by the upstream auth layer, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

impl User {
    pub fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

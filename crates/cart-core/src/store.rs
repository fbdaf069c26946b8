//! # Cart Store Trait
//!
//! Persistence boundary for carts and cart items. Implementations live in the
//! `cart-store` crate (in-memory and PostgreSQL) and must enforce the two
//! concurrency invariants at the data layer, not in memory:
//!
//! - at most one cart per user in `Adding` status
//! - status transitions are compare-and-set: a transition whose expected
//!   current status no longer holds fails with `CartError::Conflict`

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::CartResult;
use crate::model::{Cart, CartItem};

/// Core trait for cart persistence implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart in `Adding` status, if one exists.
    async fn find_active_cart(&self, user_id: i64) -> CartResult<Option<Cart>>;

    /// Returns the user's active cart, creating one if absent.
    ///
    /// Concurrent calls for the same user must converge on a single cart;
    /// a second cart in `Adding` status is never created.
    async fn get_or_create_active_cart(&self, user_id: i64) -> CartResult<Cart>;

    /// Inserts a cart item linking `cart_id` and `item_id`.
    async fn add_item(&self, cart_id: Uuid, item_id: &str) -> CartResult<CartItem>;

    /// Returns a cart's items in insertion order.
    async fn items_for_cart(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>>;

    /// Transitions a cart `Adding → Check`, storing the gateway code and the
    /// chain it was registered on.
    ///
    /// Fails with `Conflict` if the cart is no longer in `Adding` status.
    /// Returns the updated cart.
    async fn begin_checkout(&self, cart_id: Uuid, unique_code: &str, chain: i32)
        -> CartResult<Cart>;

    /// Transitions a cart `Check → Confirmed`.
    ///
    /// Fails with `Conflict` if the cart is not in `Check` status.
    async fn confirm_cart(&self, cart_id: Uuid) -> CartResult<Cart>;

    /// Returns the user's carts in `Check` status (awaiting confirmation).
    async fn pending_carts(&self, user_id: i64) -> CartResult<Vec<Cart>>;

    /// Returns the user's carts not in `Adding` status, newest first.
    async fn history(&self, user_id: i64) -> CartResult<Vec<Cart>>;
}

/// Type alias for a shared cart store (dynamic dispatch)
pub type BoxedCartStore = Arc<dyn CartStore>;

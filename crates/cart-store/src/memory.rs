//! In-memory cart store for tests and local development.
//!
//! Provides the same interface and transition semantics as the PostgreSQL
//! implementation, including compare-and-set conflicts and the single
//! active-cart-per-user guarantee (all mutations run under one write lock).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use cart_core::{Cart, CartError, CartItem, CartResult, CartStatus, CartStore};

#[derive(Default)]
struct Inner {
    carts: Vec<Cart>,
    items: Vec<CartItem>,
}

/// In-memory `CartStore` implementation
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCartStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of carts stored.
    pub async fn cart_count(&self) -> usize {
        self.inner.read().await.carts.len()
    }

    /// Clears all carts and items.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.carts.clear();
        inner.items.clear();
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find_active_cart(&self, user_id: i64) -> CartResult<Option<Cart>> {
        let inner = self.inner.read().await;
        Ok(inner
            .carts
            .iter()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Adding)
            .cloned())
    }

    async fn get_or_create_active_cart(&self, user_id: i64) -> CartResult<Cart> {
        let mut inner = self.inner.write().await;

        if let Some(cart) = inner
            .carts
            .iter()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Adding)
        {
            return Ok(cart.clone());
        }

        let cart = Cart::new(user_id);
        inner.carts.push(cart.clone());
        Ok(cart)
    }

    async fn add_item(&self, cart_id: Uuid, item_id: &str) -> CartResult<CartItem> {
        let mut inner = self.inner.write().await;

        if !inner.carts.iter().any(|c| c.id == cart_id) {
            return Err(CartError::not_found(format!("cart {cart_id}")));
        }

        let item = CartItem::new(cart_id, item_id);
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn items_for_cart(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn begin_checkout(
        &self,
        cart_id: Uuid,
        unique_code: &str,
        chain: i32,
    ) -> CartResult<Cart> {
        let mut inner = self.inner.write().await;

        let cart = inner
            .carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .ok_or_else(|| CartError::not_found(format!("cart {cart_id}")))?;

        if cart.status != CartStatus::Adding {
            return Err(CartError::Conflict { cart_id });
        }

        cart.status = CartStatus::Check;
        cart.unique_code = unique_code.to_string();
        cart.chain = chain;
        Ok(cart.clone())
    }

    async fn confirm_cart(&self, cart_id: Uuid) -> CartResult<Cart> {
        let mut inner = self.inner.write().await;

        let cart = inner
            .carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .ok_or_else(|| CartError::not_found(format!("cart {cart_id}")))?;

        if cart.status != CartStatus::Check {
            return Err(CartError::Conflict { cart_id });
        }

        cart.status = CartStatus::Confirmed;
        Ok(cart.clone())
    }

    async fn pending_carts(&self, user_id: i64) -> CartResult<Vec<Cart>> {
        let inner = self.inner.read().await;
        Ok(inner
            .carts
            .iter()
            .filter(|c| c.user_id == user_id && c.status == CartStatus::Check)
            .cloned()
            .collect())
    }

    async fn history(&self, user_id: i64) -> CartResult<Vec<Cart>> {
        let inner = self.inner.read().await;
        let mut carts: Vec<Cart> = inner
            .carts
            .iter()
            .filter(|c| c.user_id == user_id && c.status != CartStatus::Adding)
            .cloned()
            .collect();
        carts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(carts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_reuses_active_cart() {
        let store = InMemoryCartStore::new();

        let first = store.get_or_create_active_cart(1).await.unwrap();
        let second = store.get_or_create_active_cart(1).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.cart_count().await, 1);

        // A different user gets their own cart.
        let other = store.get_or_create_active_cart(2).await.unwrap();
        assert_ne!(other.id, first.id);
    }

    #[tokio::test]
    async fn test_checkout_frees_the_active_slot() {
        let store = InMemoryCartStore::new();

        let cart = store.get_or_create_active_cart(1).await.unwrap();
        store.begin_checkout(cart.id, "ABC123", 1).await.unwrap();

        // The old cart left Adding, so a fresh one can be created.
        let next = store.get_or_create_active_cart(1).await.unwrap();
        assert_ne!(next.id, cart.id);
        assert_eq!(store.cart_count().await, 2);
    }

    #[tokio::test]
    async fn test_begin_checkout_conflicts_when_not_adding() {
        let store = InMemoryCartStore::new();

        let cart = store.get_or_create_active_cart(1).await.unwrap();
        store.begin_checkout(cart.id, "ABC123", 1).await.unwrap();

        let err = store.begin_checkout(cart.id, "DEF456", 1).await.unwrap_err();
        assert!(matches!(err, CartError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_confirm_requires_check_status() {
        let store = InMemoryCartStore::new();

        let cart = store.get_or_create_active_cart(1).await.unwrap();
        let err = store.confirm_cart(cart.id).await.unwrap_err();
        assert!(matches!(err, CartError::Conflict { .. }));

        store.begin_checkout(cart.id, "ABC123", 1).await.unwrap();
        let confirmed = store.confirm_cart(cart.id).await.unwrap();
        assert_eq!(confirmed.status, CartStatus::Confirmed);

        // Second confirm conflicts (idempotence is the caller's concern).
        let err = store.confirm_cart(cart.id).await.unwrap_err();
        assert!(matches!(err, CartError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_add_item_to_missing_cart_fails() {
        let store = InMemoryCartStore::new();
        let err = store.add_item(Uuid::new_v4(), "vinyl").await.unwrap_err();
        assert!(matches!(err, CartError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let store = InMemoryCartStore::new();

        let first = store.get_or_create_active_cart(1).await.unwrap();
        store.begin_checkout(first.id, "AAA", 1).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let second = store.get_or_create_active_cart(1).await.unwrap();
        store.begin_checkout(second.id, "BBB", 1).await.unwrap();

        // Still-active carts never show in history.
        store.get_or_create_active_cart(1).await.unwrap();

        let history = store.history(1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }
}

//! # Checkout Orchestrator
//!
//! Drives a cart through its lifecycle (`Adding → Check → Confirmed`),
//! calling the summary calculator and the payment gateway.
//!
//! The gateway registration is performed with no store lock held; only the
//! final status write is a compare-and-set against the store. A failed
//! registration therefore leaves the cart in `Adding` with no code set, and
//! retrying checkout is safe.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CartError, CartResult};
use crate::gateway::{BoxedPaymentGateway, ChainPolicy};
use crate::model::{Cart, CartItem, User};
use crate::store::BoxedCartStore;
use crate::summary::{summarize, CartSummary};

/// Result of a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    /// The cart that was submitted
    pub cart_id: Uuid,
    /// Gateway-assigned checkout code
    pub unique_code: String,
    /// Chain the transaction was registered on (after clamping)
    pub chain: i32,
    /// Total sent to the gateway (pre-truncation)
    pub total: f64,
}

/// A past order: the cart plus its summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub cart: Cart,
    pub summary: CartSummary,
}

/// Checkout orchestrator.
///
/// Holds the store, the gateway, the catalog, and the chain policy; every
/// request-scoped operation (add-item, checkout, reconcile, history) is a
/// method here.
#[derive(Clone)]
pub struct CheckoutService {
    store: BoxedCartStore,
    gateway: BoxedPaymentGateway,
    catalog: Arc<Catalog>,
    chains: ChainPolicy,
}

impl CheckoutService {
    pub fn new(
        store: BoxedCartStore,
        gateway: BoxedPaymentGateway,
        catalog: Arc<Catalog>,
        chains: ChainPolicy,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
            chains,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Add a catalog item to the user's active cart, creating the cart if
    /// none exists. The cart's status is unchanged.
    #[instrument(skip(self, user), fields(user_id = user.id, item_id = %item_id))]
    pub async fn add_item(&self, user: &User, item_id: &str) -> CartResult<CartItem> {
        let item = self
            .catalog
            .get(item_id)
            .filter(|i| i.active)
            .ok_or_else(|| CartError::not_found(format!("catalog item {item_id}")))?;

        let cart = self.store.get_or_create_active_cart(user.id).await?;
        let cart_item = self.store.add_item(cart.id, &item.id).await?;

        debug!(cart_id = %cart.id, "added item to cart");
        Ok(cart_item)
    }

    /// Summary of the user's active cart; empty summary if there is none.
    pub async fn active_cart_summary(&self, user: &User) -> CartResult<CartSummary> {
        match self.store.find_active_cart(user.id).await? {
            Some(cart) => {
                let items = self.store.items_for_cart(cart.id).await?;
                Ok(summarize(&items, &self.catalog))
            }
            None => Ok(CartSummary::empty()),
        }
    }

    /// Submit the user's active cart to the gateway (`Adding → Check`).
    ///
    /// Preconditions: an active cart exists and has a non-zero total. The
    /// requested chain is clamped to the configured valid set before
    /// registration. A gateway failure aborts the transition: the cart stays
    /// in `Adding` with no code set.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn checkout(&self, user: &User, chain: i32) -> CartResult<CheckoutReceipt> {
        let cart = self
            .store
            .find_active_cart(user.id)
            .await?
            .ok_or_else(|| CartError::not_found("active cart"))?;

        let items = self.store.items_for_cart(cart.id).await?;
        let summary = summarize(&items, &self.catalog);

        if summary.is_empty() {
            return Err(CartError::Validation(
                "cannot check out an empty cart".to_string(),
            ));
        }

        let chain = self.chains.clamp(chain);

        // External I/O happens before any status write; the cart row is only
        // touched by the final compare-and-set below.
        let unique_code = self
            .gateway
            .register_transaction(&cart, &user.email, summary.total, chain)
            .await?;

        let updated = match self.store.begin_checkout(cart.id, &unique_code, chain).await {
            Ok(cart) => cart,
            Err(CartError::Conflict { cart_id }) => {
                // One retry after re-reading: the conflict may be a stale
                // read rather than a genuine concurrent checkout.
                warn!(%cart_id, "checkout transition conflict, retrying once");
                let still_active = self
                    .store
                    .find_active_cart(user.id)
                    .await?
                    .filter(|c| c.id == cart.id);
                match still_active {
                    Some(_) => self.store.begin_checkout(cart.id, &unique_code, chain).await?,
                    None => return Err(CartError::Conflict { cart_id }),
                }
            }
            Err(e) => return Err(e),
        };

        info!(
            cart_id = %updated.id,
            code = %updated.unique_code,
            chain,
            total = summary.total,
            gateway = self.gateway.gateway_name(),
            "checkout registered with gateway"
        );

        Ok(CheckoutReceipt {
            cart_id: updated.id,
            unique_code: updated.unique_code,
            chain,
            total: summary.total,
        })
    }

    /// Poll the gateway and confirm every pending cart whose code appears in
    /// the confirmed set (`Check → Confirmed`). Idempotent: already-confirmed
    /// carts are untouched, and a concurrent confirmation of the same cart is
    /// not an error.
    ///
    /// Returns the number of carts confirmed by this call.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn reconcile(&self, user: &User) -> CartResult<usize> {
        let pending = self.store.pending_carts(user.id).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let confirmed: HashSet<String> = self.gateway.poll_confirmed(user).await?;
        debug!(
            pending = pending.len(),
            confirmed = confirmed.len(),
            "reconciling pending carts"
        );

        let mut transitioned = 0;
        for cart in pending {
            if !confirmed.contains(&cart.unique_code) {
                continue;
            }
            match self.store.confirm_cart(cart.id).await {
                Ok(cart) => {
                    info!(cart_id = %cart.id, code = %cart.unique_code, "cart confirmed");
                    transitioned += 1;
                }
                // Lost the race with another reconcile; the cart is confirmed
                // either way.
                Err(CartError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(transitioned)
    }

    /// The user's order history: every cart not in `Adding`, newest first,
    /// annotated with its summary. Reconciles pending carts first.
    ///
    /// A gateway failure during reconciliation leaves pending carts in
    /// `Check`; the history still renders and the next view retries.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn order_history(&self, user: &User) -> CartResult<Vec<OrderRecord>> {
        match self.reconcile(user).await {
            Ok(_) => {}
            Err(CartError::Gateway { message }) => {
                warn!(%message, "reconciliation failed, carts remain pending");
            }
            Err(CartError::GatewayNetwork(message)) => {
                warn!(%message, "gateway unreachable, carts remain pending");
            }
            Err(e) => return Err(e),
        }

        let carts = self.store.history(user.id).await?;
        let mut records = Vec::with_capacity(carts.len());
        for cart in carts {
            let items = self.store.items_for_cart(cart.id).await?;
            let summary = summarize(&items, &self.catalog);
            records.push(OrderRecord { cart, summary });
        }

        Ok(records)
    }
}

//! # Cart Summary Calculator
//!
//! Derives the total price and line list from a cart's items. Absent or
//! unresolvable input yields an empty summary rather than an error; this is
//! the documented best-effort policy for read paths.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogItem};
use crate::model::CartItem;

/// A priced line in a summary: the cart item plus its resolved catalog row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub cart_item: CartItem,
    pub item: CatalogItem,
}

/// Summary of a cart: ordered lines and their float total.
///
/// Total is an unrounded f64 sum of per-item prices; no currency-precision
/// guarantee is imposed (the gateway truncates to whole units at checkout).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total: f64,
}

impl CartSummary {
    /// The empty summary: no lines, zero total
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the summary has no purchasable content
    pub fn is_empty(&self) -> bool {
        self.total == 0.0
    }
}

/// Compute a summary from a cart's items against the catalog.
///
/// Lines whose catalog reference no longer resolves are skipped; the total
/// covers resolvable lines only. Callers with no cart pass an empty slice and
/// get `CartSummary::empty()`.
pub fn summarize(cart_items: &[CartItem], catalog: &Catalog) -> CartSummary {
    let mut items = Vec::with_capacity(cart_items.len());
    let mut total = 0.0;

    for cart_item in cart_items {
        if let Some(item) = catalog.get(&cart_item.item_id) {
            total += item.price;
            items.push(CartLine {
                cart_item: cart_item.clone(),
                item: item.clone(),
            });
        }
    }

    CartSummary { items, total }
}

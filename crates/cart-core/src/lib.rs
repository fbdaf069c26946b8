//! # cart-core
//!
//! Core types and orchestration for the cryptocart checkout engine.
//!
//! This crate provides:
//! - `Cart`, `CartItem`, and `CartStatus` for the persisted cart model
//! - `Catalog` and `CatalogItem` for the read-only item catalog
//! - `CartSummary` and the summary calculator
//! - `CartStore` trait for the persistence boundary
//! - `PaymentGateway` trait and `ChainPolicy` for the payment seam
//! - `CheckoutService` driving the `Adding → Check → Confirmed` lifecycle
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CheckoutService, ChainPolicy, User};
//!
//! let service = CheckoutService::new(store, gateway, catalog, ChainPolicy::default());
//!
//! let user = User::new(42, "u@example.com");
//! service.add_item(&user, "vinyl-classic").await?;
//! let receipt = service.checkout(&user, 2).await?;
//!
//! // Later, on viewing order history, pending carts reconcile against the
//! // gateway's confirmed set.
//! let orders = service.order_history(&user).await?;
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod model;
pub mod store;
pub mod summary;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogItem};
pub use checkout::{CheckoutReceipt, CheckoutService, OrderRecord};
pub use error::{CartError, CartResult};
pub use gateway::{BoxedPaymentGateway, ChainPolicy, PaymentGateway};
pub use model::{Cart, CartItem, CartStatus, User};
pub use store::{BoxedCartStore, CartStore};
pub use summary::{summarize, CartLine, CartSummary};

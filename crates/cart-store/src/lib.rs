//! # cart-store
//!
//! `CartStore` implementations for cryptocart-rs:
//!
//! - `InMemoryCartStore` — tests and local development
//! - `PostgresCartStore` — production, backed by sqlx and the SQL migrations
//!   under `migrations/`
//!
//! Both enforce the same invariants: at most one `adding` cart per user, and
//! compare-and-set status transitions that fail with `CartError::Conflict`
//! when a concurrent request won the transition.

pub mod memory;
pub mod postgres;

// Re-exports
pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;

//! # cart-api
//!
//! HTTP API layer for cryptocart-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the cart, checkout, and order history
//! - Catalog read endpoints for the storefront
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/items` | List catalog items |
//! | GET | `/api/v1/items/{id}` | Get catalog item |
//! | GET | `/api/v1/cart` | Active cart summary |
//! | POST | `/api/v1/cart/items/{id}` | Add item to cart |
//! | POST | `/api/v1/checkout/{chain}` | Check out |
//! | GET | `/api/v1/orders` | Reconcile + order history |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};

//! # Routes
//!
//! Axum router configuration for the cart/checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /api/v1/items - List catalog items
/// - GET  /api/v1/items/{item_id} - Get catalog item
/// - GET  /api/v1/cart - Active cart summary
/// - POST /api/v1/cart/items/{item_id} - Add item to cart
/// - POST /api/v1/checkout/{chain} - Check out the active cart
/// - GET  /api/v1/orders - Reconcile and list order history
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Catalog
        .route("/items", get(handlers::list_items))
        .route("/items/{item_id}", get(handlers::get_item))
        // Cart
        .route("/cart", get(handlers::view_cart))
        .route("/cart/items/{item_id}", post(handlers::add_to_cart))
        // Checkout & orders
        .route("/checkout/{chain}", post(handlers::checkout))
        .route("/orders", get(handlers::order_history));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

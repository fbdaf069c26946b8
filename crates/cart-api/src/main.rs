//! # CryptoCart RS
//!
//! Storefront cart/checkout service backed by the CryptoPay gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export CRYPTOPAY_URL=https://pay.example.com/
//! export CRYPTOPAY_API_KEY=...
//! export DATABASE_URL=postgres://...   # optional, in-memory store otherwise
//!
//! # Run the server
//! cryptocart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::from_env().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Catalog items loaded: {}",
        state.service.catalog().items.len()
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🛒 CryptoCart starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🧺 Cart: GET http://{}/api/v1/cart", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout/{{chain}}", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! # Application State
//!
//! Shared state for the Axum application: the checkout service (store +
//! gateway + catalog + chain policy) and server configuration.

use anyhow::Context;
use cart_core::{BoxedCartStore, Catalog, ChainPolicy, CheckoutService};
use cart_gateway::CryptoPayClient;
use cart_store::{InMemoryCartStore, PostgresCartStore};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Postgres connection string; absent means the in-memory store
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout orchestrator
    pub service: CheckoutService,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the full application state from the environment: catalog file,
    /// CryptoPay credentials, chain policy, and the configured store.
    pub async fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let catalog = Arc::new(load_catalog()?);

        let gateway = CryptoPayClient::from_env()
            .map_err(|e| anyhow::anyhow!("failed to initialize CryptoPay client: {e}"))?;

        let store: BoxedCartStore = match &config.database_url {
            Some(url) => {
                let pool = sqlx::PgPool::connect(url)
                    .await
                    .context("failed to connect to Postgres")?;
                let store = PostgresCartStore::new(pool);
                store.run_migrations().await.context("migrations failed")?;
                tracing::info!("using Postgres cart store");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, carts will not survive restarts");
                Arc::new(InMemoryCartStore::new())
            }
        };

        let service = CheckoutService::new(store, Arc::new(gateway), catalog, chain_policy_from_env()?);

        Ok(Self { service, config })
    }

    /// Assemble state from pre-built parts (tests, embedding)
    pub fn with_service(service: CheckoutService, config: AppConfig) -> Self {
        Self { service, config }
    }
}

/// Parse the chain policy from `VALID_CHAINS` / `DEFAULT_CHAIN`.
///
/// The valid-chain set is deployment configuration; nothing in the codebase
/// assumes a particular gateway network list.
fn chain_policy_from_env() -> anyhow::Result<ChainPolicy> {
    let valid = match std::env::var("VALID_CHAINS") {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("VALID_CHAINS must be comma-separated integers, got {raw:?}"))?,
        Err(_) => vec![1, 2],
    };

    let default = match std::env::var("DEFAULT_CHAIN") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("DEFAULT_CHAIN must be an integer, got {raw:?}"))?,
        Err(_) => 1,
    };

    Ok(ChainPolicy::new(valid, default))
}

/// Load the item catalog from config
fn load_catalog() -> anyhow::Result<Catalog> {
    let config_paths = [
        "config/catalog.toml",
        "../config/catalog.toml",
        "../../config/catalog.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = Catalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("failed to parse {path}: {e}"))?;
            tracing::info!("loaded {} items from {}", catalog.items.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("no catalog file found, using empty catalog");
    Ok(Catalog::new())
}

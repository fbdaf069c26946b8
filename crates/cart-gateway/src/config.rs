//! # CryptoPay Configuration
//!
//! Configuration for the CryptoPay gateway integration. The API key and base
//! URL are loaded from environment variables; nothing is hard-coded or held
//! in module-level globals.

use cart_core::CartError;
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CryptoPay API configuration
#[derive(Debug, Clone)]
pub struct CryptoPayConfig {
    /// Gateway base URL (e.g., "https://api.cryptopay.example")
    pub base_url: String,

    /// Merchant API key
    pub api_key: String,

    /// Bounded per-request timeout; a timeout is a registration failure
    pub timeout: Duration,
}

impl CryptoPayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CRYPTOPAY_URL`
    /// - `CRYPTOPAY_API_KEY`
    ///
    /// Optional:
    /// - `CRYPTOPAY_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("CRYPTOPAY_URL")
            .map_err(|_| CartError::Configuration("CRYPTOPAY_URL not set".to_string()))?;

        let api_key = env::var("CRYPTOPAY_API_KEY")
            .map_err(|_| CartError::Configuration("CRYPTOPAY_API_KEY not set".to_string()))?;

        if api_key.is_empty() {
            return Err(CartError::Configuration(
                "CRYPTOPAY_API_KEY must not be empty".to_string(),
            ));
        }

        let timeout_secs = match env::var("CRYPTOPAY_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                CartError::Configuration(format!(
                    "CRYPTOPAY_TIMEOUT_SECS must be an integer, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url, api_key).with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for the transaction-register endpoint
    pub fn register_url(&self) -> String {
        format!("{}/transactions/register/", self.base_url)
    }

    /// Full URL for the confirmation-poll endpoint
    pub fn confirm_url(&self) -> String {
        format!("{}/transactions/confirm/", self.base_url)
    }
}

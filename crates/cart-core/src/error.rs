//! # Cart Error Types
//!
//! Typed error handling for the cryptocart checkout core.
//! All cart operations return `Result<T, CartError>`.

use thiserror::Error;
use uuid::Uuid;

/// Core error type for all cart/checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (empty-cart checkout, bad identity headers)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Payment gateway API error (non-2xx status, malformed response)
    #[error("Gateway error: {message}")]
    Gateway { message: String },

    /// Network/HTTP error communicating with the gateway (includes timeouts)
    #[error("Gateway network error: {0}")]
    GatewayNetwork(String),

    /// Concurrent modification of the same cart
    #[error("Conflict: cart {cart_id} was modified concurrently")]
    Conflict { cart_id: Uuid },

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(String),
}

impl CartError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        CartError::NotFound { what: what.into() }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CartError::GatewayNetwork(_) | CartError::Conflict { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::Validation(_) => 400,
            CartError::NotFound { .. } => 404,
            CartError::Gateway { .. } => 502,
            CartError::GatewayNetwork(_) => 502,
            CartError::Conflict { .. } => 409,
            CartError::Store(_) => 500,
        }
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;

//! # cart-gateway
//!
//! CryptoPay gateway client for cryptocart-rs.
//!
//! Implements `cart_core::PaymentGateway` over the CryptoPay HTTP API:
//!
//! - `POST {base_url}/transactions/register/` — register a transaction,
//!   returns the unique checkout code used to correlate confirmations
//! - `GET {base_url}/transactions/confirm/` — poll the confirmed transaction
//!   codes for a customer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_gateway::CryptoPayClient;
//!
//! // Reads CRYPTOPAY_URL and CRYPTOPAY_API_KEY
//! let gateway = CryptoPayClient::from_env()?;
//!
//! let code = gateway
//!     .register_transaction(&cart, &user.email, summary.total, chain)
//!     .await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::CryptoPayClient;
pub use config::CryptoPayConfig;

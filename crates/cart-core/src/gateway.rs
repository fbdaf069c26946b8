//! # Payment Gateway Trait
//!
//! Seam between the checkout orchestrator and the external crypto-payment
//! service. The HTTP implementation lives in the `cart-gateway` crate.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::CartResult;
use crate::model::{Cart, User};

/// Core trait for payment gateway implementations.
///
/// Both operations are blocking external I/O; callers must not hold a store
/// lock across them. Any network or decoding failure propagates as an error,
/// never a silent fallback.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a transaction for a cart and return the gateway's unique
    /// checkout code.
    ///
    /// The amount sent is `total` truncated to an integer; amounts are not
    /// fractional in the gateway's currency unit.
    async fn register_transaction(
        &self,
        cart: &Cart,
        customer_email: &str,
        total: f64,
        chain: i32,
    ) -> CartResult<String>;

    /// Fetch the set of confirmed transaction codes for a user.
    async fn poll_confirmed(&self, user: &User) -> CartResult<HashSet<String>>;

    /// Gateway name (for logging)
    fn gateway_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Which chains a transaction may be registered on.
///
/// The true set of valid chains is deployment configuration, not a property
/// of this code; an out-of-range chain falls back to the configured default.
#[derive(Debug, Clone)]
pub struct ChainPolicy {
    valid: Vec<i32>,
    default: i32,
}

impl ChainPolicy {
    /// Create a policy from a valid set and a default chain.
    ///
    /// The default is always treated as valid.
    pub fn new(valid: Vec<i32>, default: i32) -> Self {
        let mut valid = valid;
        if !valid.contains(&default) {
            valid.push(default);
        }
        Self { valid, default }
    }

    /// Clamp a requested chain: valid chains pass through, everything else
    /// becomes the default.
    pub fn clamp(&self, chain: i32) -> i32 {
        if self.valid.contains(&chain) {
            chain
        } else {
            self.default
        }
    }

    pub fn default_chain(&self) -> i32 {
        self.default
    }

    pub fn valid_chains(&self) -> &[i32] {
        &self.valid
    }
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self::new(vec![1, 2], 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_chain_passes_through() {
        let policy = ChainPolicy::default();
        assert_eq!(policy.clamp(1), 1);
        assert_eq!(policy.clamp(2), 2);
    }

    #[test]
    fn test_out_of_range_chain_clamps_to_default() {
        let policy = ChainPolicy::default();
        assert_eq!(policy.clamp(7), 1);
        assert_eq!(policy.clamp(0), 1);
        assert_eq!(policy.clamp(-3), 1);
    }

    #[test]
    fn test_default_is_always_valid() {
        let policy = ChainPolicy::new(vec![5, 6], 9);
        assert_eq!(policy.clamp(9), 9);
        assert_eq!(policy.clamp(5), 5);
        assert_eq!(policy.clamp(1), 9);
    }
}

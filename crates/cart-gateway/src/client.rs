//! # CryptoPay Client
//!
//! HTTP implementation of the `PaymentGateway` trait against the CryptoPay
//! API. Two endpoints: transaction registration at checkout, and confirmation
//! polling for reconciliation.
//!
//! Every network, status, or decoding failure maps to a `CartError` and
//! propagates to the caller; the client never swallows a gateway failure.

use crate::config::CryptoPayConfig;
use async_trait::async_trait;
use cart_core::{Cart, CartError, CartResult, PaymentGateway, User};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument};

/// CryptoPay gateway client
pub struct CryptoPayClient {
    config: CryptoPayConfig,
    client: Client,
}

impl CryptoPayClient {
    /// Create a new client from config
    pub fn new(config: CryptoPayConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CartError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = CryptoPayConfig::from_env()?;
        Self::new(config)
    }

    fn map_send_error(e: reqwest::Error) -> CartError {
        if e.is_timeout() {
            CartError::GatewayNetwork(format!("request timed out: {e}"))
        } else {
            CartError::GatewayNetwork(e.to_string())
        }
    }

    async fn read_ok_body(response: reqwest::Response) -> CartResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::GatewayNetwork(e.to_string()))?;

        if !status.is_success() {
            error!("CryptoPay API error: status={}, body={}", status, body);
            return Err(CartError::Gateway {
                message: format!("HTTP {status}: {body}"),
            });
        }

        Ok(body)
    }

    /// A body that fails to decode counts as a gateway failure, same as a
    /// non-2xx status.
    fn decode_body<T: serde::de::DeserializeOwned>(endpoint: &str, body: &str) -> CartResult<T> {
        serde_json::from_str(body).map_err(|e| CartError::Gateway {
            message: format!("malformed {endpoint} response: {e}"),
        })
    }
}

#[async_trait]
impl PaymentGateway for CryptoPayClient {
    #[instrument(skip(self, cart, customer_email), fields(cart_id = %cart.id))]
    async fn register_transaction(
        &self,
        cart: &Cart,
        customer_email: &str,
        total: f64,
        chain: i32,
    ) -> CartResult<String> {
        // Amounts are whole units in the gateway's currency; the fractional
        // part is dropped, not rounded.
        let request = RegisterRequest {
            chain,
            key: &self.config.api_key,
            customer_email,
            amount: total as i64,
        };

        debug!(amount = request.amount, "registering transaction");

        let response = self
            .client
            .post(self.config.register_url())
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let body = Self::read_ok_body(response).await?;

        let registered: RegisterResponse = Self::decode_body("register", &body)?;

        if registered.checkout_code.is_empty() {
            return Err(CartError::Gateway {
                message: "gateway returned an empty checkout code".to_string(),
            });
        }

        info!(code = %registered.checkout_code, "transaction registered");
        Ok(registered.checkout_code)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn poll_confirmed(&self, user: &User) -> CartResult<HashSet<String>> {
        let request = ConfirmRequest {
            key: &self.config.api_key,
            customer_email: &user.email,
        };

        let response = self
            .client
            .get(self.config.confirm_url())
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let body = Self::read_ok_body(response).await?;

        let confirmed: ConfirmResponse = Self::decode_body("confirm", &body)?;

        debug!(
            count = confirmed.confirmed_transactions.len(),
            "fetched confirmed transactions"
        );

        Ok(confirmed.confirmed_transactions.into_iter().collect())
    }

    fn gateway_name(&self) -> &'static str {
        "cryptopay"
    }
}

// =============================================================================
// CryptoPay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    chain: i32,
    key: &'a str,
    customer_email: &'a str,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    checkout_code: String,
}

#[derive(Debug, Serialize)]
struct ConfirmRequest<'a> {
    key: &'a str,
    customer_email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    #[serde(default)]
    confirmed_transactions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_request_wire_shape() {
        let request = RegisterRequest {
            chain: 2,
            key: "k123",
            customer_email: "u@example.com",
            amount: 14,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "chain": 2,
                "key": "k123",
                "customer_email": "u@example.com",
                "amount": 14
            })
        );
    }

    #[test]
    fn test_register_response_ignores_extra_fields() {
        let body = r#"{"checkout_code": "ABC123", "expires_in": 900}"#;
        let parsed: RegisterResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.checkout_code, "ABC123");
    }

    #[test]
    fn test_register_response_missing_code_is_error() {
        let body = r#"{"status": "ok"}"#;
        assert!(serde_json::from_str::<RegisterResponse>(body).is_err());
    }

    #[test]
    fn test_malformed_body_maps_to_gateway_error() {
        let err = CryptoPayClient::decode_body::<RegisterResponse>("register", "not json")
            .unwrap_err();
        assert!(matches!(err, CartError::Gateway { .. }));
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_confirm_response_collects_codes() {
        let body = r#"{"confirmed_transactions": ["ABC123", "XYZ999"], "count": 2}"#;
        let parsed: ConfirmResponse = serde_json::from_str(body).unwrap();
        let codes: HashSet<String> = parsed.confirmed_transactions.into_iter().collect();
        assert!(codes.contains("ABC123"));
        assert!(codes.contains("XYZ999"));
    }

    #[test]
    fn test_confirm_response_defaults_to_empty() {
        let parsed: ConfirmResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.confirmed_transactions.is_empty());
    }

    #[test]
    fn test_amount_truncation() {
        // 9.99 + 4.50 registers as 14, matching the gateway's whole-unit amounts.
        assert_eq!(14.49_f64 as i64, 14);
        assert_eq!(0.99_f64 as i64, 0);
    }
}

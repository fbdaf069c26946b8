//! # Request Handlers
//!
//! Axum request handlers for the cart/checkout API. Identity is read from
//! the `x-user-id` / `x-user-email` headers set by the upstream auth layer.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cart_core::{CartError, CartSummary, CheckoutReceipt, OrderRecord, User};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Active cart view: the summary plus the empty flag the storefront renders
#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub summary: CartSummary,
    pub empty: bool,
}

/// Checkout response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub cart_id: uuid::Uuid,
    /// Show this code to the customer; it correlates gateway confirmations
    pub unique_code: String,
    pub chain: i32,
    pub total: f64,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        Self {
            cart_id: receipt.cart_id,
            unique_code: receipt.unique_code,
            chain: receipt.chain,
            total: receipt.total,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn cart_error_to_response(err: CartError) -> HandlerError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Read the authenticated user from request headers.
///
/// The auth layer in front of this service sets both headers; requests
/// without them are unauthenticated.
fn current_user(headers: &HeaderMap) -> Result<User, HandlerError> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Missing or invalid x-user-id/x-user-email headers",
                401,
            )),
        )
    };

    let id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(unauthorized)?;

    let email = headers
        .get("x-user-email")
        .and_then(|v| v.to_str().ok())
        .filter(|e| !e.is_empty())
        .ok_or_else(unauthorized)?;

    Ok(User::new(id, email))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cryptocart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List active catalog items
pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    let items: Vec<_> = state.service.catalog().active_items().collect();
    Json(serde_json::json!({
        "items": items,
        "count": items.len()
    }))
}

/// Get a single catalog item
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let item = state.service.catalog().get(&item_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Item not found: {item_id}"), 404)),
        )
    })?;

    Ok(Json(item.clone()))
}

/// View the current user's active cart
#[instrument(skip(state, headers))]
pub async fn view_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CartView>, HandlerError> {
    let user = current_user(&headers)?;

    let summary = state
        .service
        .active_cart_summary(&user)
        .await
        .map_err(cart_error_to_response)?;

    let empty = summary.is_empty();
    Ok(Json(CartView { summary, empty }))
}

/// Add a catalog item to the current user's active cart
#[instrument(skip(state, headers), fields(item_id = %item_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, HandlerError> {
    let user = current_user(&headers)?;

    state
        .service
        .add_item(&user, &item_id)
        .await
        .map_err(|e| {
            error!("add-to-cart failed: {e}");
            cart_error_to_response(e)
        })?;

    Ok(StatusCode::CREATED)
}

/// Check out the current user's active cart on the given chain
#[instrument(skip(state, headers))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(chain): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, HandlerError> {
    let user = current_user(&headers)?;

    let receipt = state.service.checkout(&user, chain).await.map_err(|e| {
        error!("checkout failed: {e}");
        cart_error_to_response(e)
    })?;

    Ok(Json(CheckoutResponse::from(receipt)))
}

/// Order history: reconciles pending carts against the gateway, then lists
/// all non-active carts newest first
#[instrument(skip(state, headers))]
pub async fn order_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let user = current_user(&headers)?;

    let orders: Vec<OrderRecord> = state
        .service
        .order_history(&user)
        .await
        .map_err(cart_error_to_response)?;

    Ok(Json(serde_json::json!({
        "orders": orders,
        "count": orders.len()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_cart_error_conversion() {
        let (status, _json) = cart_error_to_response(CartError::Validation("empty".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _json) = cart_error_to_response(CartError::not_found("active cart"));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _json) = cart_error_to_response(CartError::Gateway {
            message: "boom".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_current_user_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("42"));
        headers.insert("x-user-email", HeaderValue::from_static("u@example.com"));

        let user = current_user(&headers).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "u@example.com");
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let headers = HeaderMap::new();
        let (status, _) = current_user(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-number"));
        headers.insert("x-user-email", HeaderValue::from_static("u@example.com"));
        let (status, _) = current_user(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

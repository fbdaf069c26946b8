//! HTTP-level tests: router + handlers over the in-memory store with a
//! scripted gateway.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use cart_api::{create_router, AppConfig, AppState};
use cart_core::{
    Cart, CartError, CartResult, Catalog, CatalogItem, ChainPolicy, CheckoutService,
    PaymentGateway, User,
};
use cart_store::InMemoryCartStore;
use serde_json::Value;

#[derive(Default)]
struct FakeGateway {
    code: Option<String>,
    confirmed: Mutex<HashSet<String>>,
}

impl FakeGateway {
    fn succeeding(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            confirmed: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn register_transaction(
        &self,
        _cart: &Cart,
        _customer_email: &str,
        _total: f64,
        _chain: i32,
    ) -> CartResult<String> {
        self.code.clone().ok_or(CartError::Gateway {
            message: "registration rejected".to_string(),
        })
    }

    async fn poll_confirmed(&self, _user: &User) -> CartResult<HashSet<String>> {
        Ok(self.confirmed.lock().unwrap().clone())
    }

    fn gateway_name(&self) -> &'static str {
        "fake"
    }
}

fn test_server(gateway: FakeGateway) -> (TestServer, Arc<FakeGateway>) {
    let mut catalog = Catalog::new();
    catalog.add(CatalogItem::new("vinyl-classic", "Classic Vinyl", 9.99));
    catalog.add(CatalogItem::new("poster-a2", "A2 Poster", 4.50));

    let gateway = Arc::new(gateway);
    let service = CheckoutService::new(
        Arc::new(InMemoryCartStore::new()),
        gateway.clone(),
        Arc::new(catalog),
        ChainPolicy::default(),
    );

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        database_url: None,
    };

    let server = TestServer::new(create_router(AppState::with_service(service, config))).unwrap();
    (server, gateway)
}

fn as_user(request: axum_test::TestRequest, id: &str, email: &str) -> axum_test::TestRequest {
    use axum::http::{HeaderName, HeaderValue};
    request
        .add_header(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(id).unwrap(),
        )
        .add_header(
            HeaderName::from_static("x-user-email"),
            HeaderValue::from_str(email).unwrap(),
        )
}

#[tokio::test]
async fn health_is_open() {
    let (server, _) = test_server(FakeGateway::succeeding("ABC123"));
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn cart_requires_identity_headers() {
    let (server, _) = test_server(FakeGateway::succeeding("ABC123"));
    let response = server.get("/api/v1/cart").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn list_items_shows_catalog() {
    let (server, _) = test_server(FakeGateway::succeeding("ABC123"));
    let response = server.get("/api/v1/items").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["count"], 2);

    let response = server.get("/api/v1/items/vinyl-classic").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["price"], 9.99);

    let response = server.get("/api/v1/items/missing").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn add_view_checkout_flow() {
    let (server, _) = test_server(FakeGateway::succeeding("ABC123"));

    // Empty cart at first.
    let response = as_user(server.get("/api/v1/cart"), "1", "u@example.com").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["empty"], true);
    assert_eq!(body["total"], 0.0);

    // Add two items.
    as_user(
        server.post("/api/v1/cart/items/vinyl-classic"),
        "1",
        "u@example.com",
    )
    .await
    .assert_status(axum::http::StatusCode::CREATED);
    as_user(
        server.post("/api/v1/cart/items/poster-a2"),
        "1",
        "u@example.com",
    )
    .await
    .assert_status(axum::http::StatusCode::CREATED);

    let response = as_user(server.get("/api/v1/cart"), "1", "u@example.com").await;
    let body: Value = response.json();
    assert_eq!(body["empty"], false);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    // Checkout on chain 2.
    let response = as_user(server.post("/api/v1/checkout/2"), "1", "u@example.com").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["unique_code"], "ABC123");
    assert_eq!(body["chain"], 2);

    // Cart is no longer active; the next view is empty again.
    let response = as_user(server.get("/api/v1/cart"), "1", "u@example.com").await;
    assert_eq!(response.json::<Value>()["empty"], true);
}

#[tokio::test]
async fn checkout_without_cart_is_404() {
    let (server, _) = test_server(FakeGateway::succeeding("ABC123"));
    let response = as_user(server.post("/api/v1/checkout/1"), "1", "u@example.com").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn gateway_failure_surfaces_as_502_and_cart_survives() {
    let (server, _) = test_server(FakeGateway::default());

    as_user(
        server.post("/api/v1/cart/items/vinyl-classic"),
        "1",
        "u@example.com",
    )
    .await
    .assert_status(axum::http::StatusCode::CREATED);

    let response = as_user(server.post("/api/v1/checkout/1"), "1", "u@example.com").await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    // The cart is still there, still active.
    let response = as_user(server.get("/api/v1/cart"), "1", "u@example.com").await;
    assert_eq!(response.json::<Value>()["empty"], false);
}

#[tokio::test]
async fn orders_reconcile_and_list() {
    let (server, gateway) = test_server(FakeGateway::succeeding("ABC123"));

    as_user(
        server.post("/api/v1/cart/items/vinyl-classic"),
        "1",
        "u@example.com",
    )
    .await
    .assert_status(axum::http::StatusCode::CREATED);
    as_user(server.post("/api/v1/checkout/1"), "1", "u@example.com")
        .await
        .assert_status_ok();

    // Not yet confirmed by the gateway.
    let response = as_user(server.get("/api/v1/orders"), "1", "u@example.com").await;
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["orders"][0]["cart"]["status"], "check");

    // Gateway settles the code; the next view flips the cart.
    gateway.confirmed.lock().unwrap().insert("ABC123".to_string());
    let response = as_user(server.get("/api/v1/orders"), "1", "u@example.com").await;
    let body: Value = response.json();
    assert_eq!(body["orders"][0]["cart"]["status"], "confirmed");
}

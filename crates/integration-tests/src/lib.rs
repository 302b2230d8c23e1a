//! Integration test harness for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: [`MockCatalog`] serves the catalog/stock
//! API from an in-process axum server bound to an ephemeral port, and cart
//! storage lives in a temporary directory.
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store over real HTTP and file storage
//! - `cart_api` - Storefront JSON routes end to end

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rocket_shoes_storefront::config::{CatalogConfig, StorefrontConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Shared state of the mock catalog.
#[derive(Default)]
struct MockState {
    products: RwLock<HashMap<i32, Value>>,
    stock: RwLock<HashMap<i32, u32>>,
    failing: AtomicBool,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
}

/// In-process catalog/stock API.
///
/// The server is stopped when the value is dropped.
pub struct MockCatalog {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockCatalog {
    /// Start the server on `127.0.0.1` with an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to point a catalog client at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Catalog client configuration for this server.
    #[must_use]
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.base_url()).unwrap()
    }

    /// Storefront configuration using this server and `storage_path`.
    #[must_use]
    pub fn storefront_config(&self, storage_path: &std::path::Path) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            catalog: self.catalog_config(),
            storage_path: storage_path.to_path_buf(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Register a product with its stock level.
    ///
    /// Products are served with the legacy `image` field and a numeric price,
    /// the way the original catalog API does.
    pub fn add_product(&self, id: i32, title: &str, price: f64, image: &str, stock: u32) {
        self.state.products.write().unwrap().insert(
            id,
            json!({ "id": id, "title": title, "price": price, "image": image }),
        );
        self.set_stock(id, stock);
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        self.state.stock.write().unwrap().insert(id, amount);
    }

    /// Make every endpoint answer `500 Internal Server Error`.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn stock(State(state): State<Arc<MockState>>, Path(id): Path<i32>) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let amount = state.stock.read().unwrap().get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn product(State(state): State<Arc<MockState>>, Path(id): Path<i32>) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let product = state.products.read().unwrap().get(&id).cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

//! Catalog and stock API access.
//!
//! # Architecture
//!
//! - The catalog service is the source of truth for product metadata and stock
//! - Stock is read on every cart mutation that can raise a quantity and is
//!   never cached
//! - Product metadata is cached in memory via `moka` (5 minute TTL by default)
//!
//! # Endpoints
//!
//! ```text
//! GET {base}/stock/{id}     -> { "id": 1, "amount": 5 }
//! GET {base}/products/{id}  -> { "id": 1, "title": "...", "price": 179.9, "image": "..." }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_storefront::catalog::{CatalogApi, CatalogClient};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//!
//! let stock = client.stock(ProductId::new(1)).await?;
//! let product = client.product(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::CatalogClient;

use std::future::Future;

use rocket_shoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only access to the remote catalog.
///
/// The cart store only depends on this trait, so tests can substitute an
/// in-memory catalog for the HTTP client.
pub trait CatalogApi: Send + Sync {
    /// Fetch the current stock level of a product.
    fn stock(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Fetch product metadata.
    fn product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

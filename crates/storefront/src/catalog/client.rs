//! HTTP implementation of [`CatalogApi`].
//!
//! Uses `reqwest` for HTTP and caches product metadata with `moka`.
//! Stock levels always go to the network.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rocket_shoes_core::{Product, ProductId, Stock};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogApi, CatalogError};
use crate::config::CatalogConfig;

/// Maximum number of products kept in the metadata cache.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Body of `GET stock/{id}`. The `id` echoed back by the API is ignored.
#[derive(Debug, Deserialize)]
struct StockResponse {
    amount: u32,
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog/stock API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = (config.product_cache_ttl > Duration::ZERO).then(|| {
            Cache::builder()
                .max_capacity(PRODUCT_CACHE_CAPACITY)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET a path relative to the base URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.inner.base_url.join(path)?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e.to_string())
        })
    }
}

impl CatalogApi for CatalogClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        let response: StockResponse = self.get_json(&format!("stock/{product_id}")).await?;
        debug!(amount = response.amount, "Fetched stock");
        Ok(Stock::new(product_id, response.amount))
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&product_id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{product_id}")).await?;

        if product.id != product_id {
            return Err(CatalogError::Parse(format!(
                "requested product {product_id}, API returned {}",
                product.id
            )));
        }

        if let Some(cache) = &self.inner.products {
            cache.insert(product_id, product.clone()).await;
        }

        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base: &str, ttl: u64) -> CatalogConfig {
        CatalogConfig {
            product_cache_ttl: Duration::from_secs(ttl),
            ..CatalogConfig::new(base).unwrap()
        }
    }

    #[test]
    fn test_client_keeps_normalized_base_url() {
        let client = CatalogClient::new(&config("http://localhost:3333/api", 300)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3333/api/");
    }

    #[test]
    fn test_zero_ttl_disables_product_cache() {
        let client = CatalogClient::new(&config("http://localhost:3333", 0)).unwrap();
        assert!(client.inner.products.is_none());

        let client = CatalogClient::new(&config("http://localhost:3333", 60)).unwrap();
        assert!(client.inner.products.is_some());
    }

    #[test]
    fn test_stock_response_ignores_id() {
        let response: StockResponse = serde_json::from_str(r#"{"id":3,"amount":7}"#).unwrap();
        assert_eq!(response.amount, 7);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let client = CatalogClient::new(&config("http://127.0.0.1:9", 0)).unwrap();
        let err = client.stock(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{BroadcastNotifier, CartStore};
use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::storage::FileStorage;

/// The cart store as wired up by the storefront binary.
pub type StorefrontCart = CartStore<CatalogClient, FileStorage, BroadcastNotifier>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the cart store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: StorefrontCart,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the persisted cart from `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let storage = FileStorage::new(&config.storage_path);
        let cart = CartStore::new(catalog, storage, BroadcastNotifier::new());

        Ok(Self {
            inner: Arc::new(AppStateInner { config, cart }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &StorefrontCart {
        &self.inner.cart
    }
}

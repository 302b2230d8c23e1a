//! Cart store: the single owner of the shopper's cart.
//!
//! # Lifecycle
//!
//! 1. [`CartStore::new`] loads the persisted cart (empty if none or unreadable)
//! 2. [`CartStore::add_product`], [`CartStore::remove_product`] and
//!    [`CartStore::update_product_amount`] compute a new snapshot, persist it,
//!    then publish it to subscribers
//! 3. [`CartStore::cart`] / [`CartStore::subscribe`] expose read-only snapshots
//!
//! # Consistency
//!
//! Mutations are serialized by a single-writer lock held for the whole
//! read, fetch, compute, persist and publish cycle, so two overlapping
//! operations can never overwrite each other's result. Readers are never
//! blocked: snapshots are immutable `Arc<Cart>`s behind a `watch` channel.
//!
//! Storage reads and writes are synchronous, so mutations run them on the
//! blocking thread pool instead of the async workers.
//!
//! A failed operation leaves the cart untouched, reports a
//! [`CartNotification`] to the configured [`Notifier`] and returns the
//! [`CartError`].

mod error;
mod notify;

pub use error::{
    ADD_FAILED_MESSAGE, CartError, CartErrorKind, FailureCause, OUT_OF_STOCK_MESSAGE, Operation,
    REMOVE_FAILED_MESSAGE, UPDATE_FAILED_MESSAGE,
};
pub use notify::{
    BroadcastNotifier, CartNotification, Notifier, RecordingNotifier, TracingNotifier,
};

use std::sync::Arc;

use rocket_shoes_core::{Cart, ProductId};
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use crate::catalog::CatalogApi;
use crate::storage::{CartPersistence, KeyValueStorage, StorageError};

/// Input of [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested absolute amount (not a delta).
    pub amount: i64,
}

/// Shared cart state with validated, persisted mutations.
pub struct CartStore<C, S, N = TracingNotifier> {
    catalog: C,
    persistence: Arc<CartPersistence<S>>,
    notifier: N,
    writer: Mutex<()>,
    snapshot: watch::Sender<Arc<Cart>>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: CatalogApi,
    S: KeyValueStorage + 'static,
    N: Notifier,
{
    /// Create a store, loading the persisted cart from `storage`.
    pub fn new(catalog: C, storage: S, notifier: N) -> Self {
        let persistence = Arc::new(CartPersistence::new(storage));
        let cart = persistence.load();
        info!(lines = cart.len(), "Cart store initialized");

        let (snapshot, _) = watch::channel(Arc::new(cart));

        Self {
            catalog,
            persistence,
            notifier,
            writer: Mutex::new(()),
            snapshot,
        }
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.snapshot.borrow().clone()
    }

    /// Receive every snapshot published after a successful mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.snapshot.subscribe()
    }

    /// Catalog used for stock and product lookups.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Add one unit of a product.
    ///
    /// Stock and product metadata are fetched concurrently. An existing line
    /// is incremented in place, a new product is appended with an amount of 1.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the cart already holds all available units
    /// - [`CartError::AddFailed`] if a lookup or the storage write fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let result = self.try_add(product_id).await;
        self.report(result)
    }

    async fn try_add(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let _writer = self.writer.lock().await;

        let (stock, product) = tokio::try_join!(
            self.catalog.stock(product_id),
            self.catalog.product(product_id),
        )
        .map_err(|e| CartError::failed(Operation::Add, product_id, e))?;

        let next = self
            .cart()
            .add_one(&product, stock)
            .map_err(|r| CartError::rejected(Operation::Add, product_id, r))?;

        self.commit(next)
            .await
            .map_err(|e| CartError::failed(Operation::Add, product_id, e))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// [`CartError::RemoveFailed`] if the product is not in the cart or the
    /// storage write fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let result = self.try_remove(product_id).await;
        self.report(result)
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let _writer = self.writer.lock().await;

        let next = self
            .cart()
            .without(product_id)
            .map_err(|r| CartError::rejected(Operation::Remove, product_id, r))?;

        self.commit(next)
            .await
            .map_err(|e| CartError::failed(Operation::Remove, product_id, e))
    }

    /// Set a line's amount to exactly `update.amount`.
    ///
    /// The product must already be in the cart and the amount must be at
    /// least 1; both are checked before stock is fetched.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the amount exceeds available stock
    /// - [`CartError::UpdateFailed`] if a precondition fails, the stock lookup
    ///   fails or the storage write fails
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<Arc<Cart>, CartError> {
        let result = self.try_update(update).await;
        self.report(result)
    }

    async fn try_update(&self, update: UpdateProductAmount) -> Result<Arc<Cart>, CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        let _writer = self.writer.lock().await;

        let current = self.cart();
        current
            .check_amount(product_id, amount)
            .map_err(|r| CartError::rejected(Operation::Update, product_id, r))?;

        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| CartError::failed(Operation::Update, product_id, e))?;

        let next = current
            .with_amount(product_id, amount, stock)
            .map_err(|r| CartError::rejected(Operation::Update, product_id, r))?;

        self.commit(next)
            .await
            .map_err(|e| CartError::failed(Operation::Update, product_id, e))
    }

    /// Empty the cart and delete it from storage.
    ///
    /// # Errors
    ///
    /// Returns error if the storage write fails; the cart is unchanged then.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _writer = self.writer.lock().await;
        self.persist(CartPersistence::clear).await?;
        self.snapshot.send_replace(Arc::new(Cart::new()));
        info!("Cart cleared");
        Ok(())
    }

    /// Run a storage operation on the blocking thread pool.
    async fn persist<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(&CartPersistence<S>) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let persistence = Arc::clone(&self.persistence);
        tokio::task::spawn_blocking(move || op(&persistence)).await?
    }

    /// Persist `next`, then make it the current snapshot.
    ///
    /// Must be called with the writer lock held.
    async fn commit(&self, next: Cart) -> Result<Arc<Cart>, StorageError> {
        let next = Arc::new(next);
        let saved = Arc::clone(&next);
        self.persist(move |persistence| persistence.save(&saved)).await?;

        self.snapshot.send_replace(Arc::clone(&next));
        info!(
            lines = next.len(),
            total_quantity = next.total_quantity(),
            "Cart updated"
        );
        Ok(next)
    }

    /// Log and notify a failed operation.
    fn report(&self, result: Result<Arc<Cart>, CartError>) -> Result<Arc<Cart>, CartError> {
        if let Err(err) = &result {
            match err.cause() {
                None => info!(error = %err, "Cart operation rejected"),
                Some(cause) => warn!(error = %err, cause = %cause, "Cart operation failed"),
            }
            self.notifier.notify(&CartNotification::from(err));
        }
        result
    }
}

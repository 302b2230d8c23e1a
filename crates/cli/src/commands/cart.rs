//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! CATALOG_API_URL=http://localhost:3333 rs-cli cart add 1
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Base URL of the catalog/stock API (required)
//! - `CART_STORAGE_PATH` - Local storage file (default: `.rocketshoes/storage.json`)

use std::io::{self, Write};
use std::sync::Arc;

use rocket_shoes_core::{Cart, ProductId};
use rust_decimal::Decimal;
use rocket_shoes_storefront::cart::{CartError, CartStore, RecordingNotifier, UpdateProductAmount};
use rocket_shoes_storefront::catalog::{CatalogClient, CatalogError};
use rocket_shoes_storefront::config::{ConfigError, StorefrontConfig};
use rocket_shoes_storefront::storage::{FileStorage, StorageError};
use thiserror::Error;

/// The cart store as used by the CLI.
pub type CliCart = CartStore<CatalogClient, FileStorage, Arc<RecordingNotifier>>;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog client could not be built.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Open the cart store configured by the environment.
///
/// # Errors
///
/// Returns error if configuration is missing or the catalog client fails to build.
pub fn open_store() -> Result<CliCart, CartCommandError> {
    let config = StorefrontConfig::from_env()?;
    let catalog = CatalogClient::new(&config.catalog)?;
    let storage = FileStorage::new(&config.storage_path);

    tracing::debug!(storage = %config.storage_path.display(), "Opening cart");
    Ok(CartStore::new(
        catalog,
        storage,
        Arc::new(RecordingNotifier::new()),
    ))
}

/// Print the cart as a table.
pub fn show(store: &CliCart) {
    print_cart(&store.cart());
}

/// Add one unit of a product and print the result.
///
/// # Errors
///
/// Returns the cart error after printing the shopper message.
pub async fn add(store: &CliCart, product_id: ProductId) -> Result<(), CartCommandError> {
    let result = store.add_product(product_id).await;
    finish(store, result)
}

/// Remove a product and print the result.
///
/// # Errors
///
/// Returns the cart error after printing the shopper message.
pub async fn remove(store: &CliCart, product_id: ProductId) -> Result<(), CartCommandError> {
    let result = store.remove_product(product_id).await;
    finish(store, result)
}

/// Set a product's amount and print the result.
///
/// # Errors
///
/// Returns the cart error after printing the shopper message.
pub async fn update(
    store: &CliCart,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CartCommandError> {
    let result = store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await;
    finish(store, result)
}

/// Delete the persisted cart.
///
/// # Errors
///
/// Returns error if the storage file cannot be written.
#[allow(clippy::print_stdout)]
pub async fn clear(store: &CliCart) -> Result<(), CartCommandError> {
    store.clear().await?;
    println!("Cart cleared");
    Ok(())
}

/// Print the new cart, or the pending notifications on failure.
fn finish(store: &CliCart, result: Result<Arc<Cart>, CartError>) -> Result<(), CartCommandError> {
    match result {
        Ok(cart) => {
            print_cart(&cart);
            Ok(())
        }
        Err(err) => {
            // Best effort: the error itself is still returned
            let _ = write_notifications(store.notifier(), &mut io::stderr().lock());
            Err(err.into())
        }
    }
}

/// Drain the shopper messages recorded by `notifier` into `out`, one per line.
fn write_notifications(notifier: &RecordingNotifier, out: &mut impl Write) -> io::Result<()> {
    for notification in notifier.take() {
        writeln!(out, "{}", notification.message)?;
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    println!("{:>6}  {:<40} {:>10} {:>6} {:>12}", "ID", "PRODUCT", "PRICE", "QTY", "TOTAL");
    for item in cart.items() {
        println!(
            "{:>6}  {:<40} {:>10.2} {:>6} {:>12}",
            item.product_id.to_string(),
            truncate(&item.title, 40),
            item.price,
            item.amount,
            format_total(item.line_total())
        );
    }
    println!(
        "{:>6}  {:<40} {:>10} {:>6} {:>12}",
        "",
        "SUBTOTAL",
        "",
        cart.total_quantity(),
        format_total(cart.subtotal())
    );
}

/// Two-decimal total, or `-` when it cannot be represented.
fn format_total(total: Option<Decimal>) -> String {
    total.map_or_else(|| "-".to_string(), |total| format!("{total:.2}"))
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocket_shoes_core::CartRejection;
    use rocket_shoes_storefront::cart::{
        CartErrorKind, CartNotification, Notifier, Operation, REMOVE_FAILED_MESSAGE,
        UPDATE_FAILED_MESSAGE,
    };
    use rocket_shoes_storefront::config::CatalogConfig;
    use tempfile::TempDir;

    use super::*;

    /// Store over an unreachable catalog and an empty cart file.
    fn offline_store(dir: &TempDir) -> CliCart {
        // Port 9 (discard) on localhost is closed on test machines
        let config = CatalogConfig::new("http://127.0.0.1:9").unwrap();
        let catalog = CatalogClient::new(&config).unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        CartStore::new(catalog, storage, Arc::new(RecordingNotifier::new()))
    }

    fn failed_kind(result: Result<(), CartCommandError>) -> CartErrorKind {
        match result {
            Err(CartCommandError::Cart(err)) => err.kind(),
            other => panic!("expected cart error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_notifications_drains_messages() {
        let notifier = RecordingNotifier::new();
        let id = ProductId::new(3);
        notifier.notify(&CartNotification::from(&CartError::rejected(
            Operation::Remove,
            id,
            CartRejection::NotInCart(id),
        )));
        notifier.notify(&CartNotification::from(&CartError::rejected(
            Operation::Update,
            id,
            CartRejection::InvalidAmount {
                product_id: id,
                amount: 0,
            },
        )));

        let mut out = Vec::new();
        write_notifications(&notifier, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{REMOVE_FAILED_MESSAGE}\n{UPDATE_FAILED_MESSAGE}\n")
        );
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remove_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = offline_store(&dir);

        let result = remove(&store, ProductId::new(1)).await;

        assert_eq!(failed_kind(result), CartErrorKind::RemoveFailed);
        // Messages were drained to stderr
        assert!(store.notifier().notifications().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_catalog_down_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = offline_store(&dir);

        let result = add(&store, ProductId::new(1)).await;

        assert_eq!(failed_kind(result), CartErrorKind::AddFailed);
        assert!(store.cart().is_empty());
        assert!(store.notifier().notifications().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = offline_store(&dir);

        let result = update(&store, ProductId::new(1), 2).await;

        assert_eq!(failed_kind(result), CartErrorKind::UpdateFailed);
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(Some(Decimal::new(3698, 1))), "369.80");
        assert_eq!(format_total(None), "-");
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("Shoe", 10), "Shoe");
    }

    #[test]
    fn test_truncate_long_string() {
        let out = truncate("Tênis de Caminhada Leve Confortável", 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }
}

//! Cart line items and the pure transitions between cart snapshots.
//!
//! A [`Cart`] is an ordered sequence of [`CartItem`]s, at most one per product,
//! in insertion order. It is never mutated in place: each transition borrows
//! the current snapshot and returns a new one, or a [`CartRejection`] explaining
//! why the change is not allowed. Fetching stock or product data and persisting
//! the result are left to the caller.
//!
//! # Example
//!
//! ```rust
//! use rocket_shoes_core::{Cart, Product, ProductId, Stock};
//! use rust_decimal::Decimal;
//!
//! let product = Product {
//!     id: ProductId::new(1),
//!     title: "Shoe".to_string(),
//!     price: Decimal::from(10),
//!     image_url: "x".to_string(),
//! };
//! let stock = Stock::new(ProductId::new(1), 5);
//!
//! let cart = Cart::new().add_one(&product, stock).unwrap();
//! assert_eq!(cart.get(ProductId::new(1)).map(|item| item.amount), Some(1));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::product::{Product, Stock};

/// Why a cart transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartRejection {
    /// The requested quantity exceeds the available stock.
    #[error("requested {requested} of product {product_id}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Line amounts must be at least one.
    #[error("invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i64 },

    /// The cart total is not representable once this line is counted.
    #[error("cart total overflows at product {0}")]
    TotalOverflow(ProductId),
}

/// A product reference plus the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key of the line within the cart.
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    #[serde(alias = "image")]
    pub image_url: String,
    /// Requested quantity, always at least one.
    pub amount: u32,
}

impl CartItem {
    /// Create a line for `product` with an amount of one.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            amount: 1,
        }
    }

    /// Price of the whole line (`price * amount`), `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.amount))
    }
}

/// Ordered collection of line items for the current shopping session.
///
/// Serializes as a plain JSON array of [`CartItem`]s. Deserializing goes
/// through [`TryFrom<Vec<CartItem>>`], so a stored array that breaks the
/// one-line-per-product invariant is repaired on load, and one whose total
/// cannot be represented is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Whether the product has a line in the cart.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals, `None` if it overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.checked_subtotal().ok()
    }

    /// Like [`Cart::subtotal`], naming the first line that overflows.
    fn checked_subtotal(&self) -> Result<Decimal, CartRejection> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            item.line_total()
                .and_then(|total| sum.checked_add(total))
                .ok_or(CartRejection::TotalOverflow(item.product_id))
        })
    }

    /// Refuse a transition whose result has no representable total.
    fn checked(self) -> Result<Self, CartRejection> {
        self.checked_subtotal()?;
        Ok(self)
    }

    /// Add one unit of `product`.
    ///
    /// An existing line is incremented by exactly one and keeps its position;
    /// otherwise a new line with an amount of one is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartRejection::OutOfStock`] when the current amount (zero for
    /// a product not yet in the cart) already meets or exceeds `stock`.
    pub fn add_one(&self, product: &Product, stock: Stock) -> Result<Self, CartRejection> {
        let current = self.get(product.id).map_or(0, |item| item.amount);

        if current >= stock.amount {
            return Err(CartRejection::OutOfStock {
                product_id: product.id,
                requested: current.saturating_add(1),
                available: stock.amount,
            });
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => item.amount = current + 1,
            None => items.push(CartItem::from_product(product)),
        }

        Self { items }.checked()
    }

    /// Remove the line for `product_id`, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`CartRejection::NotInCart`] if there is no such line.
    pub fn without(&self, product_id: ProductId) -> Result<Self, CartRejection> {
        if !self.contains(product_id) {
            return Err(CartRejection::NotInCart(product_id));
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.product_id != product_id)
            .cloned()
            .collect();

        Ok(Self { items })
    }

    /// Set the line for `product_id` to exactly `amount` units.
    ///
    /// # Errors
    ///
    /// - [`CartRejection::NotInCart`] if there is no such line
    /// - [`CartRejection::InvalidAmount`] if `amount` is below one
    /// - [`CartRejection::OutOfStock`] if `amount` exceeds `stock`
    pub fn with_amount(
        &self,
        product_id: ProductId,
        amount: i64,
        stock: Stock,
    ) -> Result<Self, CartRejection> {
        let requested = self.check_amount(product_id, amount)?;

        if !stock.covers(requested) {
            return Err(CartRejection::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.product_id == product_id {
                    CartItem {
                        amount: requested,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();

        Self { items }.checked()
    }

    /// Check the preconditions of [`Cart::with_amount`] that need no stock data.
    ///
    /// Returns the amount narrowed to `u32`.
    ///
    /// # Errors
    ///
    /// Same as [`Cart::with_amount`], minus the stock check.
    pub fn check_amount(&self, product_id: ProductId, amount: i64) -> Result<u32, CartRejection> {
        if !self.contains(product_id) {
            return Err(CartRejection::NotInCart(product_id));
        }

        u32::try_from(amount)
            .ok()
            .filter(|&amount| amount >= 1)
            .ok_or(CartRejection::InvalidAmount { product_id, amount })
    }
}

impl Cart {
    /// Build a cart from raw lines, merging duplicate products into the first
    /// occurrence and dropping zero-amount lines.
    pub fn from(raw: Vec<CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(raw.len());
        for item in raw.into_iter().filter(|item| item.amount > 0) {
            match items.iter_mut().find(|i| i.product_id == item.product_id) {
                Some(existing) => existing.amount = existing.amount.saturating_add(item.amount),
                None => items.push(item),
            }
        }
        Self { items }
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartRejection;

    /// Like [`From<Vec<CartItem>>`], but refuses lines whose total overflows.
    fn try_from(raw: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from(raw).checked()
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

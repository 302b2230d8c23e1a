//! Catalog records served by the remote catalog/stock API.
//!
//! Both types are read-only from the cart's perspective: the cart copies the
//! product fields it needs into its own lines and only ever compares against
//! stock, it never writes either back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Product metadata as returned by `GET products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Product image URL. Older catalog payloads call this field `image`.
    #[serde(alias = "image")]
    pub image_url: String,
}

/// Remote stock level for a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product the stock level refers to.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Units currently available.
    pub amount: u32,
}

impl Stock {
    /// Create a stock record.
    #[must_use]
    pub const fn new(product_id: ProductId, amount: u32) -> Self {
        Self { product_id, amount }
    }

    /// Whether `requested` units can be satisfied.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_numeric_price_and_legacy_image_field() {
        let json = r#"{"id":1,"title":"Tênis de Caminhada","price":179.9,"image":"https://cdn/1.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(1799, 1));
        assert_eq!(product.image_url, "https://cdn/1.jpg");
    }

    #[test]
    fn test_product_accepts_image_url_field() {
        let json = r#"{"id":2,"title":"Shoe","price":10,"imageUrl":"x"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.image_url, "x");
        assert_eq!(product.price, Decimal::from(10));
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock::new(ProductId::new(1), 3);
        assert!(stock.covers(0));
        assert!(stock.covers(3));
        assert!(!stock.covers(4));
    }

    #[test]
    fn test_stock_wire_format() {
        let stock: Stock = serde_json::from_str(r#"{"id":5,"amount":2}"#).unwrap();
        assert_eq!(stock, Stock::new(ProductId::new(5), 2));
    }
}

//! Cart route handlers.
//!
//! JSON API over the shared [`CartStore`](crate::cart::CartStore). Every
//! mutating handler answers with the new cart snapshot; failures answer with
//! `{ "error": <code>, "message": <shopper message> }`.

use axum::{Json, extract::State};
use rocket_shoes_core::{Cart, CartItem, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::UpdateProductAmount;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Cart snapshot as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_quantity: u64,
    /// Decimal subtotal as a string to preserve precision, `null` if the
    /// total cannot be represented.
    pub subtotal: Option<String>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal().map(|subtotal| {
            let mut subtotal = subtotal.round_dp(2);
            subtotal.rescale(2);
            subtotal.to_string()
        });

        Self {
            items: cart.items().to_vec(),
            total_quantity: cart.total_quantity(),
            subtotal,
        }
    }
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Add/remove request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Display the current cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(&*state.cart().cart()))
}

/// Add one unit of a product.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<Json<CartView>> {
    let cart = state.cart().add_product(request.product_id).await?;
    Ok(Json(CartView::from(&*cart)))
}

/// Set a line's amount.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateProductAmount>,
) -> Result<Json<CartView>> {
    let cart = state.cart().update_product_amount(request).await?;
    Ok(Json(CartView::from(&*cart)))
}

/// Remove a product's line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<Json<CartView>> {
    let cart = state.cart().remove_product(request.product_id).await?;
    Ok(Json(CartView::from(&*cart)))
}

/// Get cart count badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount {
        count: state.cart().cart().total_quantity(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_cart_view_totals() {
        let cart = Cart::from(vec![
            CartItem {
                product_id: ProductId::new(1),
                title: "Shoe".to_string(),
                price: Decimal::new(1799, 1),
                image_url: "x".to_string(),
                amount: 2,
            },
            CartItem {
                product_id: ProductId::new(2),
                title: "Boot".to_string(),
                price: Decimal::from(10),
                image_url: "y".to_string(),
                amount: 1,
            },
        ]);

        let view = CartView::from(&cart);
        assert_eq!(view.total_quantity, 3);
        assert_eq!(view.subtotal.as_deref(), Some("369.80"));
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert_eq!(view.total_quantity, 0);
        assert_eq!(view.subtotal.as_deref(), Some("0.00"));
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_unrepresentable_subtotal_is_null() {
        let cart = Cart::from(vec![CartItem {
            product_id: ProductId::new(1),
            title: "Gold".to_string(),
            price: Decimal::MAX,
            image_url: "x".to_string(),
            amount: 2,
        }]);

        let view = CartView::from(&cart);
        assert_eq!(view.total_quantity, 2);
        assert_eq!(view.subtotal, None);
        assert_eq!(serde_json::to_value(&view).unwrap()["subtotal"], serde_json::Value::Null);
    }

    #[test]
    fn test_product_request_camel_case() {
        let request: ProductRequest = serde_json::from_str(r#"{"productId":4}"#).unwrap();
        assert_eq!(request.product_id, ProductId::new(4));
    }
}

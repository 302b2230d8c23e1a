//! Cart operation errors.
//!
//! Every failure inside a cart operation collapses into one of four kinds
//! ([`CartErrorKind`]). The underlying cause is kept as the error source for
//! logging but is never shown to shoppers.

use rocket_shoes_core::{CartRejection, ProductId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Shopper-facing message for [`CartErrorKind::OutOfStock`].
pub const OUT_OF_STOCK_MESSAGE: &str = "Quantidade solicitada fora de estoque";
/// Shopper-facing message for [`CartErrorKind::AddFailed`].
pub const ADD_FAILED_MESSAGE: &str = "Erro na adição do produto";
/// Shopper-facing message for [`CartErrorKind::RemoveFailed`].
pub const REMOVE_FAILED_MESSAGE: &str = "Erro na remoção do produto";
/// Shopper-facing message for [`CartErrorKind::UpdateFailed`].
pub const UPDATE_FAILED_MESSAGE: &str = "Erro na alteração de quantidade do produto";

/// The cart operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

/// Error taxonomy exposed to cart consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartErrorKind {
    /// Business-rule rejection: not enough stock.
    OutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl CartErrorKind {
    /// Message to show the shopper.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::OutOfStock => OUT_OF_STOCK_MESSAGE,
            Self::AddFailed => ADD_FAILED_MESSAGE,
            Self::RemoveFailed => REMOVE_FAILED_MESSAGE,
            Self::UpdateFailed => UPDATE_FAILED_MESSAGE,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::OutOfStock => "out_of_stock",
            Self::AddFailed => "add_failed",
            Self::RemoveFailed => "remove_failed",
            Self::UpdateFailed => "update_failed",
        }
    }
}

/// What made an add/remove/update fail.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Catalog or stock lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The new cart could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A precondition of the operation did not hold.
    #[error(transparent)]
    Precondition(#[from] CartRejection),
}

/// A failed cart operation. The cart is unchanged whenever this is returned.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Out of stock: requested {requested} of product {product_id}, {available} available")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Failed to add product {product_id}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    #[error("Failed to remove product {product_id}")]
    RemoveFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    #[error("Failed to update amount of product {product_id}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },
}

impl CartError {
    /// Build the failure variant matching `operation`.
    pub fn failed(operation: Operation, product_id: ProductId, cause: impl Into<FailureCause>) -> Self {
        let cause = cause.into();
        match operation {
            Operation::Add => Self::AddFailed { product_id, cause },
            Operation::Remove => Self::RemoveFailed { product_id, cause },
            Operation::Update => Self::UpdateFailed { product_id, cause },
        }
    }

    /// Translate a refused transition: stock shortages become
    /// [`CartError::OutOfStock`], anything else fails `operation`.
    #[must_use]
    pub fn rejected(operation: Operation, product_id: ProductId, rejection: CartRejection) -> Self {
        match rejection {
            CartRejection::OutOfStock {
                product_id,
                requested,
                available,
            } => Self::OutOfStock {
                product_id,
                requested,
                available,
            },
            other => Self::failed(operation, product_id, other),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CartErrorKind {
        match self {
            Self::OutOfStock { .. } => CartErrorKind::OutOfStock,
            Self::AddFailed { .. } => CartErrorKind::AddFailed,
            Self::RemoveFailed { .. } => CartErrorKind::RemoveFailed,
            Self::UpdateFailed { .. } => CartErrorKind::UpdateFailed,
        }
    }

    /// Product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::OutOfStock { product_id, .. }
            | Self::AddFailed { product_id, .. }
            | Self::RemoveFailed { product_id, .. }
            | Self::UpdateFailed { product_id, .. } => *product_id,
        }
    }

    /// Underlying cause, if this is an infrastructure or precondition failure.
    #[must_use]
    pub const fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::OutOfStock { .. } => None,
            Self::AddFailed { cause, .. }
            | Self::RemoveFailed { cause, .. }
            | Self::UpdateFailed { cause, .. } => Some(cause),
        }
    }

    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            CartErrorKind::OutOfStock,
            CartErrorKind::AddFailed,
            CartErrorKind::RemoveFailed,
            CartErrorKind::UpdateFailed,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.user_message(), b.user_message());
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn test_rejected_maps_out_of_stock() {
        let err = CartError::rejected(
            Operation::Add,
            ProductId::new(1),
            CartRejection::OutOfStock {
                product_id: ProductId::new(1),
                requested: 3,
                available: 2,
            },
        );
        assert_eq!(err.kind(), CartErrorKind::OutOfStock);
        assert!(err.cause().is_none());
        assert_eq!(err.user_message(), OUT_OF_STOCK_MESSAGE);
    }

    #[test]
    fn test_rejected_maps_precondition_to_operation() {
        let err = CartError::rejected(
            Operation::Update,
            ProductId::new(4),
            CartRejection::NotInCart(ProductId::new(4)),
        );
        assert_eq!(err.kind(), CartErrorKind::UpdateFailed);
        assert!(matches!(err.cause(), Some(FailureCause::Precondition(_))));
        assert_eq!(err.product_id(), ProductId::new(4));
    }

    #[test]
    fn test_failed_keeps_source() {
        let err = CartError::failed(
            Operation::Add,
            ProductId::new(2),
            CatalogError::NotFound("products/2".to_string()),
        );
        assert_eq!(err.to_string(), "Failed to add product 2");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Not found: products/2"));
    }
}

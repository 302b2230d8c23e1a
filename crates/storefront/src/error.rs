//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rocket_shoes_core::CartRejection;
use serde::Serialize;
use thiserror::Error;

use crate::cart::{CartError, FailureCause};
use crate::catalog::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::OutOfStock { .. } => StatusCode::CONFLICT,
                CartError::AddFailed { cause, .. }
                | CartError::RemoveFailed { cause, .. }
                | CartError::UpdateFailed { cause, .. } => match cause {
                    FailureCause::Precondition(CartRejection::NotInCart(_))
                    | FailureCause::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
                    FailureCause::Precondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    FailureCause::Catalog(CatalogError::RateLimited(_)) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    FailureCause::Catalog(_) => StatusCode::BAD_GATEWAY,
                    FailureCause::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Cart errors carry the shopper-facing message; never expose causes
        let (code, message) = match &self {
            Self::Cart(err) => (err.kind().code(), err.user_message().to_string()),
            Self::BadRequest(msg) => ("bad_request", msg.clone()),
        };

        (
            status,
            Json(ErrorBody {
                error: code,
                message: &message,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use rocket_shoes_core::ProductId;

    use super::*;
    use crate::cart::Operation;
    use crate::storage::StorageError;

    fn cart_status(err: CartError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_cart_error_status_codes() {
        let id = ProductId::new(1);

        assert_eq!(
            cart_status(CartError::OutOfStock {
                product_id: id,
                requested: 2,
                available: 1,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            cart_status(CartError::rejected(
                Operation::Remove,
                id,
                CartRejection::NotInCart(id)
            )),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            cart_status(CartError::rejected(
                Operation::Update,
                id,
                CartRejection::InvalidAmount {
                    product_id: id,
                    amount: 0,
                }
            )),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            cart_status(CartError::failed(
                Operation::Add,
                id,
                CatalogError::Status {
                    status: 500,
                    message: String::new(),
                }
            )),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            cart_status(CartError::failed(
                Operation::Add,
                id,
                CatalogError::NotFound("products/1".to_string())
            )),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            cart_status(CartError::failed(Operation::Add, id, StorageError::Poisoned)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status_code() {
        assert_eq!(
            AppError::BadRequest("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}

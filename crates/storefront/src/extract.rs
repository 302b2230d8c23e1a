//! Request extractors.
//!
//! Rejections answer through [`AppError`], so a malformed body gets the same
//! `{ "error", "message" }` JSON shape as a failed cart operation.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON request body.
///
/// Wraps [`axum::Json`]; a missing content type or an undecodable body
/// becomes [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::post,
    };
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        value: u32,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|JsonBody(_): JsonBody<Payload>| async { "ok" }),
        )
    }

    async fn post_raw(content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = app()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let (status, _) = post_raw(Some("application/json"), r#"{"value":1}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_field_answers_json_error() {
        let (status, body) = post_raw(Some("application/json"), r#"{"other":1}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("value"));
    }

    #[tokio::test]
    async fn test_syntax_error_answers_json_error() {
        let (status, body) = post_raw(Some("application/json"), "{ nope").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_missing_content_type_answers_json_error() {
        let (status, body) = post_raw(None, r#"{"value":1}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }
}

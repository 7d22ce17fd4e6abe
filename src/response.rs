//! Response helpers shared by generated routes.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const ALLOW_COLLECTION: &str = "GET,POST,PATCH,OPTIONS";
pub const ALLOW_ITEM: &str = "GET,PATCH,DELETE,OPTIONS";

/// `{"error": "<message>"}`
pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    json(status, "application/json", &error_body(message))
}

/// Serialize `value` with the given content type. Serialization failure yields a 500 error body.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, content_type: &str, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let content_type = HeaderValue::from_str(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/json"));
            (status, [(header::CONTENT_TYPE, content_type)], Body::from(bytes)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode json")
        }
    }
}

/// 204 with an `Allow` header and no body.
pub fn allow(methods: &'static str) -> Response {
    (StatusCode::NO_CONTENT, [(header::ALLOW, HeaderValue::from_static(methods))]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_body_is_compact() {
        let resp = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Method Not Allowed"}"#);
    }

    #[test]
    fn allow_has_no_body_status() {
        let resp = allow(ALLOW_ITEM);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[header::ALLOW], "GET,PATCH,DELETE,OPTIONS");
    }
}

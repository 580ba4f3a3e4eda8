use crate::context::{Context, Reply, Responder};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper
///
/// Provides a consistent response format for controller results and for
/// errors that reach the host.
///
/// # Example
/// ```
/// use wiremount::common::ApiResponse;
/// use axum::http::StatusCode;
///
/// let ok = ApiResponse::success("index");
/// assert!(ok.success);
///
/// let err: ApiResponse<()> = ApiResponse::error(StatusCode::NOT_FOUND, "User not found");
/// assert_eq!(err.error.unwrap().code, "Not Found");
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    pub success: bool,

    #[serde(skip)]
    pub http_status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data
    ///
    /// Defaults to HTTP 200 OK.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            http_status: StatusCode::OK,
        }
    }

    /// Create an error response
    ///
    /// The error `code` is the canonical reason phrase of `status`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            data: None,
            error: Some(ApiError {
                code: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
                message: message.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }),
            success: false,
            http_status: status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

/// Success helper that wraps controller results in an [`ApiResponse`] envelope
///
/// Installed on every request context by [`ResultPlugin`](crate::app::ResultPlugin).
/// Raw byte replies are not wrapped and are written as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiResponder;

impl Responder for ApiResponder {
    fn success(&self, ctx: &Context, value: Reply) {
        let data = match value {
            Reply::Text(text) => serde_json::Value::String(text),
            Reply::Json(value) => value,
            raw @ Reply::Bytes(_) => return ctx.set_body(raw),
        };
        match serde_json::to_value(ApiResponse::success(data)) {
            Ok(envelope) => ctx.set_body(Reply::Json(envelope)),
            Err(e) => {
                tracing::error!("Failed to serialize success envelope: {}", e);
                ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_skips_error() {
        let value = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(value, serde_json::json!({ "data": 42, "success": true }));
    }

    #[test]
    fn test_error_envelope_uses_reason_phrase() {
        let response: ApiResponse<()> =
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(response.http_status, StatusCode::INTERNAL_SERVER_ERROR);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "Internal Server Error");
        assert_eq!(value["error"]["message"], "boom");
        assert!(value.get("data").is_none());
    }
}

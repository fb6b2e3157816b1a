use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::StoreError;
use serde_json::json;

// Store 错误分类到 HTTP 状态码的唯一映射点
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Canceled => StatusCode::REQUEST_TIMEOUT,
            StoreError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

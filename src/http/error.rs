use crate::errors::ApiError;
use axum::Json;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result type for every handler.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{status}: {self}");
        }
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

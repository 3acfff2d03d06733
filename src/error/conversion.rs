/**
 * Error Conversion
 *
 * Converts `ApiError` into an HTTP response so handlers can return it
 * directly. Error responses are JSON:
 *
 * ```json
 * {
 *   "error": "message",
 *   "status": 400
 * }
 * ```
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected ({}): {self}", status.as_u16());
        }

        let body = serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_found("no such product").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_unavailable() {
        let response = ApiError::unavailable("database not configured").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

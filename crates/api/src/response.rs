//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper.
///
/// `warning` carries advisory degradation notes ("created, but push
/// delivery was skipped") alongside an otherwise successful payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            warning: None,
            error: None,
        }
    }

    /// Create a success response carrying an advisory warning.
    pub fn ok_with_warning(data: T, warning: Option<impl Into<String>>) -> Self {
        Self {
            success: true,
            data: Some(data),
            warning: warning.map(Into::into),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            warning: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.error.is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_has_no_warning_field() {
        let body = serde_json::to_value(ApiResponse::ok(serde_json::json!({"id": "1"}))).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("warning").is_none());
    }

    #[test]
    fn test_warning_is_carried_alongside_success() {
        let body = serde_json::to_value(ApiResponse::ok_with_warning(
            serde_json::json!({"id": "1"}),
            Some("push notifications were not sent"),
        ))
        .unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["warning"], "push notifications were not sent");
    }
}

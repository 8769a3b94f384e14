//! Response Envelope
//!
//! Every JSON body the API emits, success or failure, has the shape
//! `{"status": ..., "message"?: ..., "data"?: ..., "error"?: ...}`.

use serde::Serialize;

/// Envelope status discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// JSON envelope wrapping every response body
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T = ()> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_omits_error() {
        let body = ApiResponse::success(json!({"day": 1}));
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"status": "success", "data": {"day": 1}})
        );
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let body = ApiResponse::error("Rate limit exceeded. Too many requests.");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"status": "error", "error": "Rate limit exceeded. Too many requests."})
        );
    }
}

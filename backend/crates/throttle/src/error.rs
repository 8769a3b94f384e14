//! Throttle Error Types
//!
//! Throttling is not a fault: it is the one control outcome of admission
//! control, kept separate from internal errors so it can never be reported
//! as a 5xx.

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::response::ApiResponse;
use platform::rate_limit::{HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET};
use thiserror::Error;

/// Body message of every 429
pub const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded. Too many requests.";

/// Admission control outcomes
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// Client exhausted its quota for the current window
    #[error("Rate limit exceeded")]
    Throttled {
        /// Configured quota
        limit: u32,
        /// Unix timestamp (seconds) at which a slot frees up
        reset_at: i64,
        /// Whole seconds until then
        retry_after: u64,
    },
}

impl ThrottleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ThrottleError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// Write the two headers present on every limited response.
pub(crate) fn insert_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(HEADER_LIMIT, HeaderValue::from(limit));
    headers.insert(HEADER_REMAINING, HeaderValue::from(remaining));
}

impl IntoResponse for ThrottleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ThrottleError::Throttled {
                limit,
                reset_at,
                retry_after,
            } => {
                let mut headers = HeaderMap::new();
                insert_quota_headers(&mut headers, limit, 0);
                headers.insert(HEADER_RESET, HeaderValue::from(reset_at));
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));

                (status, headers, ApiResponse::error(RATE_LIMIT_EXCEEDED)).into_response()
            }
        }
    }
}

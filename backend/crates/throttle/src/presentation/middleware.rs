//! Admission Middleware
//!
//! Resolves the client, asks the limiter, and either forwards the request
//! untouched (adding quota headers to the downstream response) or answers
//! 429 without calling the next stage.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::resolve_client_key;
use std::net::SocketAddr;

use crate::application::service::ThrottleState;
use crate::error::{ThrottleError, insert_quota_headers};

/// Middleware enforcing the per-client rate limit.
///
/// Use with `axum::middleware::from_fn_with_state(throttle.state(), enforce_rate_limit)`.
/// The transport address comes from `ConnectInfo<SocketAddr>`, so the app
/// should be served with `into_make_service_with_connect_info`.
pub async fn enforce_rate_limit(
    State(state): State<ThrottleState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter() else {
        return next.run(req).await;
    };

    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());
    let client = resolve_client_key(req.headers(), remote_addr.as_deref());

    let decision = limiter.decide(&client);

    if !decision.allowed {
        let retry_after = decision.retry_after_secs();
        tracing::warn!(%client, retry_after, "Rate limit exceeded");

        let reset_at = chrono::Utc::now()
            .timestamp()
            .saturating_add(i64::try_from(retry_after).unwrap_or(i64::MAX));

        return ThrottleError::Throttled {
            limit: limiter.quota(),
            reset_at,
            retry_after,
        }
        .into_response();
    }

    tracing::trace!(%client, remaining = decision.remaining, "Request admitted");

    let mut response = next.run(req).await;
    insert_quota_headers(response.headers_mut(), limiter.quota(), decision.remaining);
    response
}

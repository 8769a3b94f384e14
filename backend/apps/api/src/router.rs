//! HTTP Router
//!
//! Feature routes are mounted under `/api/v1` behind the rate-limit
//! middleware. Panic recovery, request tracing and CORS wrap everything.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    response::{IntoResponse, Response},
};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::rate_limit::{HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET};
use std::any::Any;
use throttle::{ThrottleState, enforce_rate_limit};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;

/// Build the full application router around the feature `routes`.
pub fn build_router(routes: Router, throttle: ThrottleState, cors: CorsLayer) -> Router {
    let v1 = routes
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(throttle, enforce_rate_limit));

    let app = Router::new().nest("/api/v1", v1).fallback(not_found);

    apply_layers(app, cors)
}

/// Outer layers shared by every route.
pub fn apply_layers(router: Router, cors: CorsLayer) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS policy from a comma-separated origin list; `*` allows any origin.
pub fn cors_layer(origins: &str) -> CorsLayer {
    let allow_origin = if origins.split(',').any(|origin| origin.trim() == "*") {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list([Method::GET, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers(ExposeHeaders::list([
            HeaderName::from_static(HEADER_LIMIT),
            HeaderName::from_static(HEADER_REMAINING),
            HeaderName::from_static(HEADER_RESET),
            header::RETRY_AFTER,
        ]))
}

async fn not_found() -> AppError {
    AppError::from_kind(ErrorKind::NotFound)
}

async fn method_not_allowed() -> AppError {
    AppError::from_kind(ErrorKind::MethodNotAllowed)
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "Handler panicked");

    AppError::internal("Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode},
        routing::get,
    };
    use platform::rate_limit::RateLimitConfig;
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::time::Duration;
    use throttle::Throttle;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        let addr: SocketAddr = "203.0.113.7:50000".parse().unwrap();
        Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        request(Method::GET, uri)
    }

    fn feature_routes() -> Router {
        Router::new().route("/national", get(|| async { "[]" }))
    }

    #[tokio::test]
    async fn test_feature_routes_mounted_under_v1() {
        let app = build_router(feature_routes(), ThrottleState::disabled(), cors_layer("*"));

        let response = app.oneshot(get_request("/api/v1/national")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let app = build_router(feature_routes(), ThrottleState::disabled(), cors_layer("*"));

        let response = app.oneshot(get_request("/api/v2/cases")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_envelope() {
        let app = build_router(feature_routes(), ThrottleState::disabled(), cors_layer("*"));

        let response = app
            .oneshot(request(Method::POST, "/api/v1/national"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_panic_becomes_500_envelope() {
        async fn boom() -> &'static str {
            panic!("handler exploded")
        }
        let router = Router::new().route("/boom", get(boom));
        let app = apply_layers(router, cors_layer("*"));

        let response = app.oneshot(get_request("/boom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_feature_routes_are_rate_limited() {
        let throttle = Throttle::start(RateLimitConfig::new(2, Duration::from_secs(60)));
        let app = build_router(feature_routes(), throttle.state(), cors_layer("*"));

        for expected in ["1", "0"] {
            let response = app
                .clone()
                .oneshot(get_request("/api/v1/national"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[HEADER_LIMIT], "2");
            assert_eq!(response.headers()[HEADER_REMAINING], expected);
        }

        let response = app.oneshot(get_request("/api/v1/national")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));

        throttle.shutdown().await;
    }

    #[tokio::test]
    async fn test_cors_exposes_rate_limit_headers() {
        let app = build_router(
            feature_routes(),
            ThrottleState::disabled(),
            cors_layer("http://localhost:3000, http://127.0.0.1:3000"),
        );

        let request = Request::builder()
            .uri("/api/v1/national")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(exposed.contains("x-ratelimit-remaining"));
        assert!(exposed.contains("retry-after"));
    }
}

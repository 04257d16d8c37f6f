//! Nepostore server library.
//!
//! One binary serves every face of the platform: the marketing landing
//! page, each tenant's shop, the store dashboard and the super-admin
//! console. Which one a request gets is decided from its host name.
//!
//! The crate is a library so the router can be driven in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod uploads;
pub mod visitor;

use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use nepostore_core::models::MAX_PRODUCT_IMAGES;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware, tenant_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/server/static";

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let session_layer = create_session_layer(config);
    // Room for a full set of product images plus the text fields.
    let body_limit = config.max_image_bytes.saturating_mul(MAX_PRODUCT_IMAGES + 1);

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        tenant = tracing::field::Empty,
                        mode = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::ServerConfig;

    fn router() -> Router {
        // Nothing listens on the discard port.
        let config = ServerConfig::for_api(Url::parse("http://127.0.0.1:9").unwrap());
        app(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_health_skips_dispatch() {
        let response = router()
            .oneshot(
                Request::get("/health")
                    .header(header::HOST, "acme.nepostore.xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_fails_without_api() {
        let response = router()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

//! Tenant resolution middleware.
//!
//! Resolves the request's `Host` header (and `tenant` query parameter on
//! local hosts) into a [`TenantContext`], stores it as a request extension
//! and records tenant and mode on the request span.

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use nepostore_core::tenant::TenantContext;
use tracing::Span;

use crate::state::AppState;

/// Host used when a request carries none (HTTP/1.0 clients, tests).
const FALLBACK_HOST: &str = "localhost";

/// Resolve the tenant for every request.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_request(&state, &request);

    let span = Span::current();
    span.record("mode", context.mode.as_str());
    if let Some(token) = &context.token {
        span.record("tenant", token.as_str());
    }
    sentry::configure_scope(|scope| {
        scope.set_tag("mode", context.mode.as_str());
        if let Some(token) = &context.token {
            scope.set_tag("tenant", token.as_str());
        }
    });

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Resolve a request's tenant context without running the middleware.
#[must_use]
pub fn resolve_request(state: &AppState, request: &Request) -> TenantContext {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or(FALLBACK_HOST);
    let search = request.uri().query().unwrap_or_default();
    state.resolver().resolve(host, search)
}

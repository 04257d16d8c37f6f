//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (`x-request-id`, recorded on the span)
//! 4. Tenant resolution (`TenantContext` extension, tenant and mode on the span)
//! 5. Security headers
//! 6. Session layer (tower-sessions, in-memory store)

pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod tenant;

pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use tenant::tenant_middleware;

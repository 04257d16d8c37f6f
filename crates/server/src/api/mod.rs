//! Client for the Nepostore backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is stored locally
//! - [`ApiClient`] is built once and shared through `AppState`
//! - Every request goes through a [`ScopedApi`] that carries the tenant
//!   (`x-subdomain`) and the visitor's forwarded `Cookie` header
//! - Every response is decoded into a typed payload; a body that does not
//!   fit fails with [`ApiError::Schema`] naming the endpoint
//!
//! No retries and no backoff: a failed call surfaces to the screen, which
//! turns it into a toast or an error page.
//!
//! # Example
//!
//! ```rust,ignore
//! let api = state.api().scoped(Some(&tenant), cookie);
//! let products = api.list_products().await?;
//! ```

mod auth;
mod categories;
mod customers;
mod orders;
mod pages;
mod platform;
mod products;
mod settings;
mod themes;
mod users;

pub use products::{BulkUploadResponse, ImageUpload};

use std::sync::Arc;

use axum::http::HeaderValue;
use nepostore_core::models::ValidationError;
use nepostore_core::tenant::TenantToken;
use reqwest::header::{self, HeaderMap};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ServerConfig;

/// Header naming the tenant a request is made for.
pub const TENANT_HEADER: &str = "x-subdomain";

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status other than the ones below.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Missing or expired session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected payload.
    #[error("Unexpected response from {endpoint}: {source}")]
    Schema {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Input rejected, locally or by the API.
    #[error("{0}")]
    Validation(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ApiError {
    /// Message safe to show in a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::Status { status, .. } if *status == 409 => {
                "That conflicts with existing data".to_string()
            }
            Self::Http(_) | Self::Status { .. } | Self::Schema { .. } => {
                "The store service is unavailable, please try again".to_string()
            }
        }
    }
}

/// Client for the backend REST API.
///
/// Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the service
    /// token is not a valid header value.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Validation(format!("Invalid API token: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Derive a per-request client for a tenant and forwarded cookie.
    #[must_use]
    pub fn scoped(&self, tenant: Option<&TenantToken>, cookie: Option<HeaderValue>) -> ScopedApi {
        ScopedApi {
            client: self.clone(),
            tenant: tenant.cloned(),
            cookie,
        }
    }

    /// Whether the API answers at all. Any HTTP response counts.
    pub async fn ping(&self) -> bool {
        self.inner
            .client
            .get(format!("{}/health", self.inner.base_url))
            .send()
            .await
            .is_ok()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// An [`ApiClient`] bound to one request's tenant and cookie.
#[derive(Clone, Debug)]
pub struct ScopedApi {
    client: ApiClient,
    tenant: Option<TenantToken>,
    cookie: Option<HeaderValue>,
}

impl ScopedApi {
    /// Tenant sent in `x-subdomain`, if any.
    #[must_use]
    pub const fn tenant(&self) -> Option<&TenantToken> {
        self.tenant.as_ref()
    }

    /// The same client acting for another tenant.
    #[must_use]
    pub fn for_tenant(&self, tenant: Option<&TenantToken>) -> Self {
        Self {
            client: self.client.clone(),
            tenant: tenant.cloned(),
            cookie: self.cookie.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.client.inner.base_url);
        let mut builder = self.client.inner.client.request(method, url);
        if let Some(tenant) = &self.tenant {
            builder = builder.header(TENANT_HEADER, tenant.as_str());
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.clone());
        }
        builder
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        decode(path, response).await
    }

    /// Execute a request with a JSON body and decode the reply.
    pub(crate) async fn send<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path).json(body).send().await?;
        decode(path, response).await
    }

    /// Execute a request with a JSON body, ignoring the reply body.
    pub(crate) async fn execute<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self.request(method, path).json(body).send().await?;
        expect_success(path, response).await
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path).send().await?;
        expect_success(path, response).await
    }

    /// Send a multipart form.
    pub(crate) async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path).multipart(form).send().await?;
        decode(path, response).await
    }
}

/// Decode a success body, unwrapping a `{"data": ...}` envelope if present.
async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_for_status(endpoint, status, response).await);
    }

    let text = response.text().await?;
    let parsed = serde_json::from_str::<serde_json::Value>(&text)
        .and_then(|value| serde_json::from_value(unwrap_envelope(value)));

    parsed.map_err(|source| {
        tracing::error!(
            endpoint,
            error = %source,
            body = %text.chars().take(500).collect::<String>(),
            "API response did not match schema"
        );
        ApiError::Schema {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

/// The payload of a `{"data": ...}` envelope.
///
/// Only an object whose sole key is `data` counts as an envelope; a record
/// that merely has a `data` field is returned whole.
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

async fn expect_success(endpoint: &str, response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(error_for_status(endpoint, status, response).await)
    }
}

/// Map a non-success response to an [`ApiError`].
async fn error_for_status(
    endpoint: &str,
    status: StatusCode,
    response: reqwest::Response,
) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => {
            tracing::warn!(endpoint, "API rejected session");
            return ApiError::Unauthorized;
        }
        StatusCode::NOT_FOUND => return ApiError::NotFound(endpoint.to_string()),
        _ => {}
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return ApiError::Validation(message);
    }

    tracing::error!(
        endpoint,
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "API returned non-success status"
    );
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Pull a human message out of an error body (`{"message": ...}` or
/// `{"error": ...}`), falling back to the raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        });
    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    })
}

//! Integration tests for Nepostore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nepostore-integration-tests
//! ```
//!
//! Each test starts a `wiremock` server standing in for the backend API and
//! drives the real router with `tower::ServiceExt::oneshot`. No network
//! listener and no external services are needed.
//!
//! # Test Categories
//!
//! - `tenancy` - host resolution, modes and route tables end to end
//! - `shop` - storefront pages, settings cache and checkout
//! - `dashboard` - authentication and dashboard screens

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use nepostore_server::config::ServerConfig;
use nepostore_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// The server under test plus the mock backend API it talks to.
pub struct TestApp {
    pub api: MockServer,
    pub config: ServerConfig,
    router: Router,
}

/// A fully read response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(nepostore_server::middleware::session::SESSION_COOKIE_NAME))
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }
}

impl TestApp {
    /// Start a mock API and build the router against it.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    pub async fn start() -> Self {
        let api = MockServer::start().await;
        let config = ServerConfig::for_api(Url::parse(&api.uri()).expect("mock server uri"));
        let state = AppState::new(config.clone()).expect("Failed to build state");
        Self {
            router: nepostore_server::app(state),
            api,
            config,
        }
    }

    /// Send a request through the full middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// GET `path` as seen on `host`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get(&self, host: &str, path: &str) -> TestResponse {
        self.get_with_cookie(host, path, None).await
    }

    /// GET `path` as seen on `host`, carrying a cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get_with_cookie(&self, host: &str, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::get(path).header(header::HOST, host);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    /// POST an urlencoded form, optionally with a cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_form(
        &self,
        host: &str,
        path: &str,
        form: &str,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::post(path)
            .header(header::HOST, host)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).expect("valid request"))
            .await
    }

    /// POST a multipart form with an `action` field and one file.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_file(
        &self,
        host: &str,
        path: &str,
        action: &str,
        file: (&str, &str, &str),
        cookie: Option<&str>,
    ) -> TestResponse {
        let (field, file_name, contents) = file;
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"action\"\r\n\r\n\
             {action}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {contents}\r\n\
             --{BOUNDARY}--\r\n"
        );
        let mut builder = Request::post(path).header(header::HOST, host).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).expect("valid request"))
            .await
    }
}

/// Boundary used by [`TestApp::post_file`].
const BOUNDARY: &str = "nepostore-test-boundary";

/// Store settings as the API returns them.
#[must_use]
pub fn settings_json(under_construction: bool) -> Value {
    json!({
        "data": {
            "storeName": "Acme Goods",
            "currency": "NPR",
            "insideValleyRate": "100",
            "outsideValleyRate": "150",
            "contactEmail": "hello@acme.test",
            "underConstruction": under_construction
        }
    })
}

/// One active, in-stock product.
#[must_use]
pub fn product_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "sellingPrice": "950",
        "crossedPrice": "1200",
        "status": "active",
        "quantity": 5,
        "section": "New Arrivals"
    })
}

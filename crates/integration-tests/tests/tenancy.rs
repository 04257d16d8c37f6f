//! Host resolution, modes and route tables through the real router.

use axum::http::StatusCode;
use nepostore_integration_tests::{TestApp, settings_json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_health_bypasses_tenant_dispatch() {
    let app = TestApp::start().await;
    let response = app.get("acme.nepostore.xyz", "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::start().await;
    let response = app.get("nepostore.xyz", "/health").await;
    assert!(response.headers.contains_key("x-request-id"));
    assert!(response.headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_landing_renders_marketing_page() {
    let app = TestApp::start().await;
    for host in ["nepostore.xyz", "www.nepostore.xyz"] {
        let response = app.get(host, "/").await;
        assert_eq!(response.status, StatusCode::OK, "host {host}");
        assert!(response.body.contains("Create your store"));
    }
}

#[tokio::test]
async fn test_landing_sends_dashboard_paths_to_dashboard_origin() {
    let app = TestApp::start().await;
    let response = app.get("nepostore.xyz", "/dashboard/products").await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), Some(app.config.dashboard_url.as_str()));
    assert!(!response.body.contains("sidebar"));
}

#[tokio::test]
async fn test_landing_unknown_path_redirects_home() {
    let app = TestApp::start().await;
    let response = app.get("www.nepostore.xyz", "/pricing").await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_shop_requests_carry_tenant_header() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/api/store-settings"))
        .and(header("x-subdomain", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(false)))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("x-subdomain", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&app.api)
        .await;

    let response = app.get("acme.nepostore.xyz", "/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Acme Goods"));
}

#[tokio::test]
async fn test_local_host_uses_tenant_query() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/api/store-settings"))
        .and(header("x-subdomain", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(true)))
        .mount(&app.api)
        .await;

    let response = app.get("localhost:3000", "/?tenant=acme").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("coming soon"));
}

#[tokio::test]
async fn test_under_construction_covers_every_path() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/api/store-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(true)))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/123"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.api)
        .await;

    for route in ["/", "/product/123", "/checkout", "/about-us"] {
        let response = app.get("acme.nepostore.xyz", route).await;
        assert_eq!(response.status, StatusCode::OK, "path {route}");
        assert!(response.body.contains("Acme Goods is coming soon"), "path {route}");
    }
}

#[tokio::test]
async fn test_unknown_store_is_not_found() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/api/store-settings"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "No such store"})))
        .mount(&app.api)
        .await;

    let response = app.get("ghost.nepostore.xyz", "/").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schema_mismatch_is_bad_gateway() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/api/store-settings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"storeName": 42})),
        )
        .mount(&app.api)
        .await;

    let response = app.get("acme.nepostore.xyz", "/").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(!response.body.contains("storeName"));
}

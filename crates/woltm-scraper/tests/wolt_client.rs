//! Integration tests for `WoltClient` request classification, throttling,
//! and the three platform fetchers.
//!
//! Each test stands up a local `wiremock` server that plays both the
//! restaurant API and the consumer API, so no real network traffic is made.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use woltm_core::{City, DetailStatus, Market};
use woltm_scraper::{ClientConfig, FailureKind, FetchError, WoltClient};

const VENUE_PATH: &str = "/consumer-api/venue-content-api/v3/web/venue-content/slug";

fn test_config(base: &str, interval_ms: u64) -> ClientConfig {
    ClientConfig {
        restaurant_api_url: base.to_owned(),
        consumer_api_url: base.to_owned(),
        timeout: Duration::from_secs(5),
        min_request_interval: Duration::from_millis(interval_ms),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        user_agent: "woltm-test/0.1".to_owned(),
        app_language: "en".to_owned(),
    }
}

/// Client with no throttle delay and no retries.
fn test_client(server: &MockServer) -> WoltClient {
    WoltClient::new(&test_config(&server.uri(), 0)).expect("failed to build test WoltClient")
}

fn baku() -> City {
    City {
        id: "1".to_owned(),
        name: "Baku".to_owned(),
        slug: "baku".to_owned(),
        country: Some("AZE".to_owned()),
        latitude: 40.4,
        longitude: 49.8,
    }
}

fn stub_market(id: &str, slug: &str) -> Market {
    Market {
        id: id.to_owned(),
        name: slug.to_owned(),
        slug: slug.to_owned(),
        address: None,
        city: "Baku".to_owned(),
        city_slug: "baku".to_owned(),
        country: None,
        latitude: None,
        longitude: None,
        rating_score: None,
        rating_volume: None,
        price_range: None,
        online: true,
        delivers: true,
        delivery_price: 0.0,
        estimate_minutes: None,
        estimate_range: None,
        description: None,
        tags: Vec::new(),
        detail_status: DetailStatus::Pending,
        scraped_at: chrono::Utc::now(),
    }
}

fn url(server: &MockServer, p: &str) -> reqwest::Url {
    reqwest::Url::parse(&format!("{}{p}", server.uri())).expect("valid mock url")
}

// ---------------------------------------------------------------------------
// request classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_returns_parsed_json_and_sends_platform_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(query_param("q", "milk"))
        .and(header("platform", "Web"))
        .and(header("app-language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client(&server)
        .request(Method::GET, &url(&server, "/ping"), &[("q", "milk")])
        .await
        .expect("request should succeed");
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn server_error_is_classified_as_http_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri(), 0);
    config.max_retries = 1;
    let client = WoltClient::new(&config).expect("client");
    let err = client
        .request(Method::GET, &url(&server, "/broken"), &[])
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::Http { status: 500, .. }),
        "expected Http 500, got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::Http);
}

#[tokio::test]
async fn invalid_json_is_classified_as_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .request(Method::GET, &url(&server, "/garbled"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Parse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_classified_as_network() {
    let client = WoltClient::new(&test_config("http://127.0.0.1:1", 0)).expect("client");
    let target = reqwest::Url::parse("http://127.0.0.1:1/v1/cities").expect("url");
    let err = client.request(Method::GET, &target, &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn requests_are_spaced_by_the_minimum_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(4)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(100);
    let client = WoltClient::new(&test_config(&server.uri(), 100)).expect("client");
    let target = url(&server, "/ping");

    let started = Instant::now();
    for _ in 0..4 {
        client
            .request(Method::GET, &target, &[])
            .await
            .expect("request should succeed");
    }
    assert!(
        started.elapsed() >= interval * 3,
        "4 requests finished in {:?}, expected at least {:?}",
        started.elapsed(),
        interval * 3
    );
}

#[tokio::test]
async fn failed_requests_still_consume_throttle_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = WoltClient::new(&test_config(&server.uri(), 80)).expect("client");
    let target = url(&server, "/missing");

    let started = Instant::now();
    for _ in 0..3 {
        let _ = client.request(Method::GET, &target, &[]).await;
    }
    assert!(started.elapsed() >= Duration::from_millis(160));
}

#[tokio::test]
async fn network_retries_wait_on_the_throttle_before_each_attempt() {
    let mut config = test_config("http://127.0.0.1:1", 200);
    config.max_retries = 2;
    config.retry_backoff_base_ms = 10;
    let client = WoltClient::new(&config).expect("client");
    let target = reqwest::Url::parse("http://127.0.0.1:1/v1/cities").expect("url");

    let started = Instant::now();
    let err = client.request(Method::GET, &target, &[]).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Network);
    // Three refused connections: the back-off alone stays under 50 ms, so
    // anything past two intervals comes from the throttle gating each retry.
    assert!(
        started.elapsed() >= Duration::from_millis(400),
        "retries finished in {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn timed_out_requests_are_retried_as_network_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri(), 0);
    config.timeout = Duration::from_millis(200);
    config.max_retries = 1;
    let client = WoltClient::new(&config).expect("client");

    let err = client
        .request(Method::GET, &url(&server, "/slow"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// list_cities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_cities_skips_records_without_required_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": {"$oid": "5bcd"},
                    "name": "Baku",
                    "slug": "baku",
                    "country_code_alpha3": "AZE",
                    "location": {"type": "Point", "coordinates": [49.8, 40.4]}
                },
                {"id": "no-coords", "name": "Nowhere"},
                {"name": "No id", "location": {"coordinates": [44.8, 41.7]}},
                "not-an-object"
            ]
        })))
        .mount(&server)
        .await;

    let listing = test_client(&server).list_cities().await;
    assert!(listing.error.is_none());
    assert_eq!(listing.records.len(), 1);
    assert_eq!(listing.records[0].id, "5bcd");
    assert_eq!(listing.records[0].slug, "baku");
    assert_eq!(listing.skipped, 3);
}

#[tokio::test]
async fn list_cities_returns_empty_listing_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cities"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let listing = test_client(&server).list_cities().await;
    assert!(listing.records.is_empty());
    assert!(matches!(
        listing.error,
        Some(FetchError::Http { status: 503, .. })
    ));
}

#[tokio::test]
async fn list_cities_reports_unexpected_shape_as_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let listing = test_client(&server).list_cities().await;
    assert!(listing.records.is_empty());
    assert!(matches!(listing.error, Some(FetchError::Parse { .. })));
}

#[tokio::test]
async fn list_cities_rejects_bodies_without_a_results_envelope() {
    for body in [json!([]), json!({})] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let listing = test_client(&server).list_cities().await;
        assert!(listing.records.is_empty(), "{body}");
        assert_eq!(
            listing.error.as_ref().map(FetchError::kind),
            Some(FailureKind::Parse),
            "{body}"
        );
    }
}

#[tokio::test]
async fn list_cities_accepts_an_empty_results_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let listing = test_client(&server).list_cities().await;
    assert!(listing.error.is_none());
    assert!(listing.records.is_empty());
}

// ---------------------------------------------------------------------------
// discover
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discover_flattens_sections_and_ignores_non_venue_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/retail"))
        .and(query_param("lat", "40.4"))
        .and(query_param("lon", "49.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": "Baku",
            "sections": [
                {
                    "name": "Grocery",
                    "items": [
                        {"venue": {"id": "m1", "slug": "shop-a", "name": "Shop A",
                                   "rating": {"score": 8.8, "volume": 40},
                                   "delivery_price_int": 150, "delivers": true}},
                        {"title": "Promo banner", "link": {"target": "x"}}
                    ]
                },
                {
                    "name": "Pharmacies",
                    "items": [
                        {"venue": {"id": "m2", "slug": "pharma-b"}},
                        {"venue": {"id": "m3"}}
                    ]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = test_client(&server).discover(&baku()).await;
    assert!(listing.error.is_none());
    let ids: Vec<&str> = listing.records.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert_eq!(listing.skipped, 1);

    let shop = &listing.records[0];
    assert_eq!(shop.city_slug, "baku");
    assert_eq!(shop.rating_score, Some(8.8));
    assert!((shop.delivery_price - 1.5).abs() < 1e-9);
    assert_eq!(shop.detail_status, DetailStatus::Pending);
}

#[tokio::test]
async fn discover_returns_empty_listing_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/retail"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let listing = test_client(&server).discover(&baku()).await;
    assert!(listing.records.is_empty());
    assert_eq!(listing.error.as_ref().map(FetchError::kind), Some(FailureKind::Http));
}

#[tokio::test]
async fn discover_tolerates_missing_sections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/retail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"city": "Baku"})))
        .mount(&server)
        .await;

    let listing = test_client(&server).discover(&baku()).await;
    assert!(listing.error.is_none());
    assert!(listing.records.is_empty());
}

// ---------------------------------------------------------------------------
// fetch_detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_detail_requests_catalog_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VENUE_PATH}/shop-a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "venue": {"description": "Corner shop"},
            "sections": [{"name": "Dairy", "items": [{"id": "i1", "name": "Milk"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = test_client(&server)
        .fetch_detail(&stub_market("m1", "shop-a"))
        .await
        .expect("detail should succeed");
    assert_eq!(content.sections.len(), 1);
    assert_eq!(content.sections[0].items.len(), 1);
    assert_eq!(
        content.venue.and_then(|v| v.description).as_deref(),
        Some("Corner shop")
    );
}

#[tokio::test]
async fn fetch_detail_propagates_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VENUE_PATH}/shop-a")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_detail(&stub_market("m1", "shop-a"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 404, .. }));
}

#[tokio::test]
async fn fetch_detail_rejects_non_object_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VENUE_PATH}/shop-a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("closed")))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_detail(&stub_market("m1", "shop-a"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Parse { .. }));
}

#[tokio::test]
async fn fetch_detail_rejects_bodies_without_catalog_keys() {
    for body in [json!([]), json!({}), json!({"venue": {"description": "x"}})] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{VENUE_PATH}/shop-a")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .fetch_detail(&stub_market("m1", "shop-a"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse, "{body}");
    }
}

#[tokio::test]
async fn fetch_detail_accepts_an_item_table_without_sections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VENUE_PATH}/shop-a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let content = test_client(&server)
        .fetch_detail(&stub_market("m1", "shop-a"))
        .await
        .expect("an empty item table is a valid catalog");
    assert!(content.sections.is_empty());
}

#[tokio::test]
async fn fetch_detail_requires_slug() {
    let server = MockServer::start().await;
    let err = test_client(&server)
        .fetch_detail(&stub_market("m1", " "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::MissingField { field: "slug", .. }
    ));
}

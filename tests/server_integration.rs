//! Record store integration tests
//!
//! Drive the router directly with tower's `oneshot` and verify the
//! json-server-compatible query semantics end to end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use cohort::feed::ChangeBroadcaster;
use cohort::models::ClientRecord;
use cohort::server::{create_router, AppState};
use cohort::store::MemoryStore;

fn record(
    id: i64,
    name: &str,
    industry: &str,
    tier: &str,
    signup_date: &str,
    is_active: Option<bool>,
) -> ClientRecord {
    ClientRecord {
        id,
        name: name.to_string(),
        industry: industry.to_string(),
        location: "Berlin".to_string(),
        subscription_tier: tier.to_string(),
        signup_date: signup_date.to_string(),
        is_active,
    }
}

fn sample_records() -> Vec<ClientRecord> {
    vec![
        record(1, "Acme Systems", "Technology", "Basic", "2023-05-10", Some(true)),
        record(2, "Borealis Labs", "Finance", "Premium", "2024-01-20", Some(true)),
        record(3, "Cascade Retail", "Retail", "Standard", "2024-03-02", Some(false)),
        record(4, "acme holdings", "Finance", "Basic", "2022-11-30", Some(true)),
        record(5, "Delta Manufacturing", "Technology", "Premium", "2024-06-15", None),
        record(6, "Evergreen Health", "Healthcare", "Standard", "2023-09-01", Some(false)),
    ]
}

/// Helper to build a router over an in-memory store
fn test_router(records: Vec<ClientRecord>) -> Router {
    router_with_latency(records, None)
}

fn router_with_latency(records: Vec<ClientRecord>, latency: Option<Duration>) -> Router {
    let state = Arc::new(AppState {
        store: Arc::new(MemoryStore::new(records)),
        feed: ChangeBroadcaster::new(),
        latency,
    });
    create_router(state)
}

/// Helper to GET a route and decode the JSON body
async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<u64>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let total = response
        .headers()
        .get("x-total-count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap();
    (status, total, json)
}

#[tokio::test]
async fn clients_route_filters_sorts_and_paginates() {
    let app = test_router(sample_records());

    let (status, total, json) = get_json(
        app,
        "/clients?industry=Finance&_sort=signup_date&_order=desc&_page=1&_limit=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(total, Some(2), "total counts every Finance record");
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Borealis Labs"], "newest Finance record first");
}

#[tokio::test]
async fn name_search_is_a_case_insensitive_substring_match() {
    let app = test_router(sample_records());

    let (_, total, json) = get_json(app, "/clients?name_like=ACME").await;

    assert_eq!(total, Some(2));
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn total_count_reports_the_filtered_total_not_the_page_length() {
    let app = test_router(sample_records());

    let (_, total, json) = get_json(app, "/clients?_page=2&_limit=4").await;

    assert_eq!(json.as_array().unwrap().len(), 2, "second page holds the rest");
    assert_eq!(total, Some(6), "header keeps the full match count");
}

#[tokio::test]
async fn aggregate_counts_apply_filters_but_never_pagination() {
    let app = test_router(sample_records());

    // the page window must not shrink the totals
    let (status, _, json) = get_json(app, "/clients/active?industry=Finance&_page=1&_limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["activeClients"], 2);
    assert_eq!(json["inactiveClients"], 0);
}

#[tokio::test]
async fn unflagged_records_count_in_neither_bucket() {
    let app = test_router(sample_records());

    let (_, _, json) = get_json(app, "/clients/active").await;

    // six records, one without the flag
    assert_eq!(json["activeClients"], 3);
    assert_eq!(json["inactiveClients"], 2);
}

#[tokio::test]
async fn date_bounds_compare_against_the_raw_date_strings() {
    let app = test_router(sample_records());

    let (_, total, _) = get_json(
        app,
        "/clients?signup_date_gte=2023-01-01&signup_date_lte=2024-02-01",
    )
    .await;

    assert_eq!(total, Some(3));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_router(Vec::new());

    let (status, _, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "OK");
}

#[tokio::test]
async fn configured_latency_delays_responses() {
    let app = router_with_latency(sample_records(), Some(Duration::from_millis(150)));

    let started = Instant::now();
    let (status, _, _) = get_json(app, "/clients").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        started.elapsed() >= Duration::from_millis(150),
        "response arrived before the configured delay"
    );
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let app = test_router(Vec::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/clients")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS headers missing from the response"
    );
}

//! Integration tests for NaverDataLabClient using wiremock
//!
//! These tests validate the DataLab client's behavior with mock servers.

mod common;

use chrono::NaiveDate;
use gemtrend::models::KeywordGroup;
use gemtrend::source::{fetch_all, DateRange, NaverDataLabClient, SourceError, TrendSource};
use gemtrend::utils::retry::RetryConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/v1/datalab/search";

fn client_for(server: &MockServer, max_retries: u32) -> NaverDataLabClient {
    NaverDataLabClient::with_options(
        format!("{}{SEARCH_PATH}", server.uri()),
        "test-id",
        "test-secret",
        100,
        RetryConfig::with_delays(max_retries, 1, 5),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn january() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap()
}

fn group(name: &str, aliases: &[&str]) -> KeywordGroup {
    KeywordGroup {
        name: name.to_string(),
        keywords: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

fn trend_body(entities: &[&str]) -> serde_json::Value {
    let results: Vec<_> = entities
        .iter()
        .map(|e| {
            json!({
                "title": e,
                "keywords": [e],
                "data": [
                    {"period": "2024-01-01", "ratio": 10.0},
                    {"period": "2024-01-02", "ratio": 20.5}
                ]
            })
        })
        .collect();

    json!({
        "startDate": "2024-01-01",
        "endDate": "2024-01-31",
        "timeUnit": "date",
        "results": results
    })
}

/// Test successful fetch with credential headers and request body
#[tokio::test]
async fn test_fetch_batch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(header("X-Naver-Client-Id", "test-id"))
        .and(header("X-Naver-Client-Secret", "test-secret"))
        .and(body_partial_json(json!({
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
            "timeUnit": "date",
            "keywordGroups": [{"groupName": "루비", "keywords": ["루비", "ruby"]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_body(&["루비"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let observations = client
        .fetch_batch(&[group("루비", &["루비", "ruby"])], january())
        .await
        .unwrap();

    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].entity, "루비");
    assert_eq!(observations[0].date, "2024-01-01");
    assert_eq!(observations[1].ratio, 20.5);
}

/// Test that server errors trigger retries
#[tokio::test]
async fn test_server_error_retry() {
    let mock_server = MockServer::start().await;

    // Return 500 twice, then succeed
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_body(&["진주"])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let result = client.fetch_batch(&[group("진주", &["진주"])], january()).await;

    assert!(result.is_ok(), "Should succeed after retries: {:?}", result.err());
}

/// Test 401 does not retry
#[tokio::test]
async fn test_unauthorized_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1) // Should only be called once (no retry)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let result = client.fetch_batch(&[group("진주", &["진주"])], january()).await;

    assert!(matches!(result, Err(SourceError::Unauthorized(401))));
}

/// Test 400 surfaces the provider's message without retry
#[tokio::test]
async fn test_rejected_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid keywordGroups"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let result = client.fetch_batch(&[group("진주", &["진주"])], january()).await;

    match result {
        Err(SourceError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("keywordGroups"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

/// Test max retries exceeded
#[tokio::test]
async fn test_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(3) // initial attempt + 2 retries
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let result = client.fetch_batch(&[group("진주", &["진주"])], january()).await;

    match result {
        Err(SourceError::MaxRetriesExceeded(last)) => {
            assert!(matches!(*last, SourceError::RateLimit));
        }
        other => panic!("expected MaxRetriesExceeded, got {other:?}"),
    }
}

/// Test undecodable body
#[tokio::test]
async fn test_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let result = client.fetch_batch(&[group("진주", &["진주"])], january()).await;

    assert!(matches!(result, Err(SourceError::Decode(_))));
}

/// Oversized batches are rejected before any request is sent
#[tokio::test]
async fn test_batch_too_large() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_body(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let groups: Vec<KeywordGroup> = (0..6).map(|i| group(&format!("g{i}"), &["x"])).collect();
    let client = client_for(&mock_server, 0);
    let result = client.fetch_batch(&groups, january()).await;

    assert!(matches!(
        result,
        Err(SourceError::BatchTooLarge { size: 6, max: 5 })
    ));
}

/// The full registry is split into provider-sized requests
#[tokio::test]
async fn test_fetch_all_batches_registry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(trend_body(&["a"])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let registry = common::registry_of(&["a", "b", "c", "d", "e", "f", "g"]);
    let client = client_for(&mock_server, 0);
    let observations = fetch_all(&client, &registry, january(), 5).await.unwrap();

    // two requests, each answered with the same two-point series
    assert_eq!(observations.len(), 4);
}

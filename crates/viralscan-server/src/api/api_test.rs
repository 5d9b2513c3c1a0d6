use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use tower::ServiceExt;
use viralscan_core::{FilterSpec, MemoryHistoryStore, NewSearch};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn test_state(base_url: &str, api_key: Option<&str>) -> AppState {
    let youtube = YoutubeClient::with_base_url(api_key, 5, "viralscan-test/0.1", base_url)
        .expect("client construction should not fail");
    AppState {
        youtube: Arc::new(youtube),
        history: Arc::new(MemoryHistoryStore::new()),
        settings: SearchSettings::default(),
    }
}

fn test_app(state: AppState) -> Router {
    build_app(state, RateLimitState::new(100, Duration::from_secs(60)))
}

fn search_request(body: &Value, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/youtube-search")
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }
    builder.body(Body::empty()).expect("request")
}

fn delete_request(uri: &str, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }
    builder.body(Body::empty()).expect("request")
}

/// App over a history store seeded with `(user, keyword)` searches.
fn seeded_app(searches: &[(&str, &str)]) -> (Router, Vec<uuid::Uuid>) {
    let history = MemoryHistoryStore::new();
    let ids = searches
        .iter()
        .map(|(user, keyword)| {
            let spec = FilterSpec::for_keyword(keyword).expect("valid keyword");
            history
                .insert_search(NewSearch::new(user, &spec))
                .expect("insert search")
                .id
        })
        .collect();
    let app = test_app(AppState {
        history: Arc::new(history),
        ..test_state("http://127.0.0.1:9", None)
    });
    (app, ids)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

async fn mount_upstream(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": { "kind": "youtube#video", "videoId": "low" } },
                { "id": { "kind": "youtube#video", "videoId": "high" } }
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "low",
                    "snippet": {
                        "channelId": "UC1",
                        "title": "",
                        "channelTitle": "Cooking",
                        "publishedAt": "2025-01-01T00:00:00Z",
                        "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/low/mq.jpg" } }
                    },
                    "statistics": { "viewCount": "1200" },
                    "contentDetails": { "duration": "PT8M" }
                },
                {
                    "id": "high",
                    "snippet": { "channelId": "UC1", "title": "Big one", "channelTitle": "Cooking" },
                    "statistics": { "viewCount": "2500000", "likeCount": "900" },
                    "contentDetails": { "duration": "PT12M3S" }
                }
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "UC1",
                    "snippet": { "title": "Cooking", "publishedAt": "2012-01-01T00:00:00Z" },
                    "statistics": { "subscriberCount": "48000" }
                }
            ]
        })))
        .mount(server)
        .await;
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("configuration_error", StatusCode::INTERNAL_SERVER_ERROR),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ("not_found", StatusCode::NOT_FOUND),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
    ];
    for (code, status) in cases {
        let response = ApiError::new(code, "boom").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn youtube_errors_map_to_error_codes() {
    assert_eq!(ApiError::from(YoutubeError::MissingApiKey).code, "configuration_error");
    let upstream = ApiError::from(YoutubeError::Upstream {
        endpoint: "channels",
        status: 403,
        body: "quotaExceeded".to_string(),
    });
    assert_eq!(upstream.code, "upstream_error");
    assert!(upstream.error.contains("quotaExceeded"));
    assert_eq!(
        ApiError::from(YoutubeError::Validation(
            viralscan_core::ValidationError::EmptyKeyword
        ))
        .code,
        "validation_error"
    );
}

#[tokio::test]
async fn health_reports_missing_api_key_and_echoes_request_id() {
    let app = test_app(test_state("http://127.0.0.1:9", None));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["youtubeApiKey"], "missing");
    assert_eq!(json["requestId"], "req-42");
}

#[tokio::test]
async fn blank_keyword_is_a_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = test_app(test_state(&server.uri(), Some("test-key")));
    let (status, json) = send(&app, search_request(&json!({ "keyword": "   " }), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "validation_error");
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = test_app(test_state("http://127.0.0.1:9", Some("test-key")));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/youtube-search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn missing_api_key_is_a_configuration_error() {
    let app = test_app(test_state("http://127.0.0.1:9", None));
    let (status, json) = send(&app, search_request(&json!({ "keyword": "cats" }), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "configuration_error");
}

#[tokio::test]
async fn search_returns_sorted_results() {
    let server = MockServer::start().await;
    mount_upstream(&server).await;

    let app = test_app(test_state(&server.uri(), Some("test-key")));
    let body = json!({ "keyword": "cooking", "sortBy": "views", "minViews": null });
    let (status, json) = send(&app, search_request(&body, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 2);
    let results = json["results"].as_array().expect("results array");
    assert_eq!(results[0]["videoId"], "high");
    assert_eq!(results[0]["viewCount"], 2_500_000);
    assert_eq!(results[0]["subscriberCount"], 48_000);
    assert_eq!(results[1]["videoId"], "low");
}

#[tokio::test]
async fn upstream_failure_returns_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(r#"{"error":{"message":"quotaExceeded"}}"#),
        )
        .mount(&server)
        .await;

    let app = test_app(test_state(&server.uri(), Some("test-key")));
    let (status, json) = send(&app, search_request(&json!({ "keyword": "cats" }), None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "upstream_error");
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("quotaExceeded")));
    assert!(json.get("results").is_none());
}

#[tokio::test]
async fn search_with_user_id_is_recorded_in_history() {
    let server = MockServer::start().await;
    mount_upstream(&server).await;

    let app = test_app(test_state(&server.uri(), Some("test-key")));
    let (status, _) = send(
        &app,
        search_request(&json!({ "keyword": "cooking" }), Some("user-1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, get_request("/api/v1/searches", Some("user-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    let search = &json["searches"][0];
    assert_eq!(search["keyword"], "cooking");
    assert_eq!(search["filters"]["maxResultCount"], 20);
    let search_id = search["id"].as_str().expect("search id").to_string();

    let (status, json) = send(
        &app,
        get_request(&format!("/api/v1/searches/{search_id}/results"), Some("user-1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    let low = json["results"]
        .as_array()
        .expect("results array")
        .iter()
        .find(|r| r["videoId"] == "low")
        .expect("low row");
    assert_eq!(low["title"], "Untitled");
    assert_eq!(low["thumbnailUrl"], "https://i.ytimg.com/vi/low/mq.jpg");
    assert_eq!(low["videoUrl"], "https://www.youtube.com/watch?v=low");

    let (status, json) = send(&app, get_request("/api/v1/searches", Some("user-2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);

    let (status, json) = send(
        &app,
        get_request(&format!("/api/v1/searches/{search_id}/results"), Some("user-2")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn anonymous_search_is_not_recorded() {
    let server = MockServer::start().await;
    mount_upstream(&server).await;

    let history = Arc::new(MemoryHistoryStore::new());
    let store: Arc<dyn SearchHistoryStore> = history.clone();
    let app = test_app(AppState {
        history: store,
        ..test_state(&server.uri(), Some("test-key"))
    });

    let (status, _) = send(&app, search_request(&json!({ "keyword": "cooking" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(history.list_searches("user-1").expect("list").is_empty());
}

#[tokio::test]
async fn history_routes_require_user_and_valid_id() {
    let app = test_app(test_state("http://127.0.0.1:9", None));

    let (status, json) = send(&app, get_request("/api/v1/searches", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let (status, json) = send(
        &app,
        get_request("/api/v1/searches/not-a-uuid/results", Some("user-1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let (status, json) = send(
        &app,
        get_request(
            &format!("/api/v1/searches/{}/results", uuid::Uuid::new_v4()),
            Some("user-1"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn history_list_filters_by_keyword() {
    let (app, _) = seeded_app(&[
        ("user-1", "Bolo de Cenoura"),
        ("user-1", "bolo de chocolate"),
        ("user-1", "pão de queijo"),
        ("user-2", "bolo de fubá"),
    ]);

    let (status, json) = send(&app, get_request("/api/v1/searches?q=BOLO", Some("user-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    let keywords: Vec<&str> = json["searches"]
        .as_array()
        .expect("searches array")
        .iter()
        .filter_map(|s| s["keyword"].as_str())
        .collect();
    assert_eq!(keywords, ["bolo de chocolate", "Bolo de Cenoura"]);

    let (_, json) = send(&app, get_request("/api/v1/searches?q=", Some("user-1"))).await;
    assert_eq!(json["count"], 3);

    let (_, json) = send(&app, get_request("/api/v1/searches?q=pizza", Some("user-1"))).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn delete_search_is_scoped_to_owner() {
    let (app, ids) = seeded_app(&[("user-1", "cats"), ("user-1", "dogs")]);
    let uri = format!("/api/v1/searches/{}", ids[0]);

    let (status, json) = send(&app, delete_request(&uri, Some("user-2"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");

    let (status, json) = send(&app, delete_request(&uri, Some("user-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted"], 1);

    let (_, json) = send(&app, get_request("/api/v1/searches", Some("user-1"))).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["searches"][0]["keyword"], "dogs");

    let (status, _) = send(&app, get_request(&format!("{uri}/results"), Some("user-1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        delete_request("/api/v1/searches/not-a-uuid", Some("user-1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn clear_history_removes_only_callers_searches() {
    let (app, _) = seeded_app(&[("user-1", "cats"), ("user-1", "dogs"), ("user-2", "birds")]);

    let (status, json) = send(&app, delete_request("/api/v1/searches", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let (status, json) = send(&app, delete_request("/api/v1/searches", Some("user-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], 2);

    let (_, json) = send(&app, get_request("/api/v1/searches", Some("user-1"))).await;
    assert_eq!(json["count"], 0);
    let (_, json) = send(&app, get_request("/api/v1/searches", Some("user-2"))).await;
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn search_route_is_rate_limited() {
    let app = build_app(
        test_state("http://127.0.0.1:9", None),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (first, _) = send(&app, search_request(&json!({ "keyword": "cats" }), None)).await;
    assert_eq!(first, StatusCode::INTERNAL_SERVER_ERROR);

    let (second, json) = send(&app, search_request(&json!({ "keyword": "cats" }), None)).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "rate_limited");

    let (health, _) = send(&app, get_request("/api/v1/health", None)).await;
    assert_eq!(health, StatusCode::OK);
}

//! Integration tests for the paginated fetcher and failure classification using wiremock

use core::time::Duration;
use repo_pulse_lib::facts::{Client, FetchErrorKind, MAX_PAGES, Paginator, RateLimitRetry};
use repo_pulse_lib::{Diagnostics, Severity};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/repos/octo/widgets/issues";

fn next_link(server: &MockServer, page: u32) -> String {
    format!(r#"<{}{LIST_PATH}?page={page}>; rel="next""#, server.uri())
}

async fn fetch(server: &MockServer, retry: RateLimitRetry, diagnostics: &Diagnostics) -> Result<Vec<Value>, repo_pulse_lib::facts::FetchError> {
    let client = Client::new(None, server.uri()).unwrap();
    Paginator::new(&client, retry)
        .fetch_all(LIST_PATH, &[("state", "all".to_string())], "octo/widgets", diagnostics)
        .await
}

#[tokio::test]
async fn test_follows_next_links_until_last_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(query_param("state", "all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1 }, { "id": 2 }]))
                .insert_header("link", next_link(&server, 2).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 3 }])))
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::new();
    let items = fetch(&server, RateLimitRetry::default(), &diagnostics).await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[2]["id"], 3);
    assert!(diagnostics.entries().is_empty());
}

#[tokio::test]
async fn test_never_requests_more_than_page_limit() {
    let server = MockServer::start().await;

    // Every page claims another one follows.
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1 }]))
                .insert_header("link", next_link(&server, 9999).as_str()),
        )
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::new();
    let items = fetch(&server, RateLimitRetry::default(), &diagnostics).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), MAX_PAGES as usize);
    assert_eq!(items.len(), MAX_PAGES as usize);

    let entries = diagnostics.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Warn);
    assert!(entries[0].message.contains("page limit"));
}

#[tokio::test]
async fn test_empty_first_page_is_not_a_warning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::new();
    let items = fetch(&server, RateLimitRetry::default(), &diagnostics).await.unwrap();

    assert!(items.is_empty());
    assert!(diagnostics.entries().is_empty());
}

#[tokio::test]
async fn test_empty_page_after_next_link_stops_with_warning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1 }]))
                .insert_header("link", next_link(&server, 2).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", next_link(&server, 3).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::new();
    let items = fetch(&server, RateLimitRetry::default(), &diagnostics).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(diagnostics.count_at_least(Severity::Warn), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_null_page_stops_with_warning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("null").insert_header("content-type", "application/json"))
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::new();
    let items = fetch(&server, RateLimitRetry::default(), &diagnostics).await.unwrap();

    assert!(items.is_empty());
    assert!(diagnostics.entries()[0].message.contains("null"));
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (404, FetchErrorKind::NotFound),
        (401, FetchErrorKind::Unauthorized),
        (403, FetchErrorKind::RateLimitedOrForbidden),
        (429, FetchErrorKind::RateLimitedOrForbidden),
        (409, FetchErrorKind::Conflict),
        (204, FetchErrorKind::NoContent),
        (500, FetchErrorKind::Unclassified),
        (502, FetchErrorKind::Unclassified),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let error = fetch(&server, RateLimitRetry::default(), &Diagnostics::new()).await.unwrap_err();
        assert_eq!(error.kind(), expected, "status {status}");
    }
}

#[tokio::test]
async fn test_undecodable_body_is_unclassified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let error = fetch(&server, RateLimitRetry::default(), &Diagnostics::new()).await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Unclassified);
}

#[tokio::test]
async fn test_failure_on_later_page_fails_the_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1 }]))
                .insert_header("link", next_link(&server, 2).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = fetch(&server, RateLimitRetry::default(), &Diagnostics::new()).await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Unclassified);
}

#[tokio::test]
async fn test_rate_limit_is_not_retried_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1704067200"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = fetch(&server, RateLimitRetry::default(), &Diagnostics::new()).await.unwrap_err();

    assert_eq!(error.kind(), FetchErrorKind::RateLimitedOrForbidden);
    assert_eq!(error.rate_limit().map(|rl| rl.remaining), Some(0));
}

#[tokio::test]
async fn test_rate_limit_retry_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let retry = RateLimitRetry {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
    };
    let diagnostics = Diagnostics::new();
    let items = fetch(&server, retry, &diagnostics).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert!(diagnostics.entries()[0].message.contains("rate limited"));
}

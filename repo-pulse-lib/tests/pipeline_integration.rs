//! End-to-end tests of a collection run against a wiremock GitHub API

use chrono::{DateTime, Utc};
use repo_pulse_lib::facts::{FetchOutcome, NoProgress, RepoId, ResourceKind};
use repo_pulse_lib::{ResultBundle, RunConfig, Severity, run_pipeline};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z").unwrap().to_utc()
}

fn config(server: &MockServer, targets: &[&str]) -> RunConfig {
    RunConfig {
        targets: targets.iter().map(ToString::to_string).collect(),
        api_url: server.uri(),
        call_delay_ms: 0,
        repo_delay_ms: 0,
        ..RunConfig::default()
    }
}

fn id(text: &str) -> RepoId {
    RepoId::parse(text).unwrap()
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount every endpoint of a repository with the given contributors and no other activity.
async fn mount_repo(server: &MockServer, full_name: &str, language: &str, contributors: Value) {
    let base = format!("/repos/{full_name}");
    mount_json(
        server,
        &base,
        json!({
            "full_name": full_name,
            "stargazers_count": 10,
            "forks_count": 2,
            "language": language,
            "created_at": "2022-06-01T12:00:00Z",
        }),
    )
    .await;
    mount_json(server, &format!("{base}/issues"), json!([])).await;
    mount_json(server, &format!("{base}/contributors"), contributors).await;
    mount_json(server, &format!("{base}/commits"), json!([])).await;
    mount_json(server, &format!("{base}/pulls"), json!([])).await;
}

async fn collect(server: &MockServer, targets: &[&str]) -> ResultBundle {
    run_pipeline(&config(server, targets), now(), &NoProgress).await.unwrap()
}

#[tokio::test]
async fn test_contributor_commits_sum_across_repositories() {
    let server = MockServer::start().await;
    mount_repo(&server, "octo/a", "Rust", json!([{ "login": "alice", "contributions": 5 }])).await;
    mount_repo(&server, "octo/b", "Go", json!([{ "login": "alice", "contributions": 7 }, { "login": "bob", "contributions": 1 }])).await;

    let bundle = collect(&server, &["octo/a", "octo/b"]).await;

    assert_eq!(bundle.contributors.len(), 2);
    assert_eq!(bundle.contributors[0].login, "alice");
    assert_eq!(bundle.contributors[0].total_commits, 12);
    assert_eq!(bundle.contributors[0].repo_count, 2);
    assert_eq!(bundle.overall.unique_contributors, 2);
    assert_eq!(bundle.overall.total_repos, 2);
    assert_eq!(bundle.overall.total_stars, 20);
    assert!(bundle.outcomes.values().all(|o| *o == FetchOutcome::Success));
}

#[tokio::test]
async fn test_basic_info_failure_excludes_repository() {
    let server = MockServer::start().await;
    mount_repo(&server, "octo/a", "Rust", json!([{ "login": "alice", "contributions": 5 }])).await;
    mount_status(&server, "/repos/octo/ghost", 404).await;

    let bundle = collect(&server, &["octo/a", "octo/ghost"]).await;

    assert!(bundle.outcomes[&id("octo/ghost")].is_critical());
    assert_eq!(bundle.outcomes[&id("octo/a")], FetchOutcome::Success);
    assert_eq!(bundle.repo_metrics.len(), 1);
    assert_eq!(bundle.repo_metrics[0].full_name, "octo/a");
    assert_eq!(bundle.overall.total_repos, 1);
    assert_eq!(bundle.languages.len(), 1);

    // No optional resource is requested for a repository without basic info.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/repos/octo/ghost/")));

    assert!(bundle
        .diagnostics
        .iter()
        .any(|d| d.scope == "octo/ghost" && d.severity == Severity::Warn));
}

#[tokio::test]
async fn test_optional_resource_failure_keeps_repository() {
    let server = MockServer::start().await;
    mount_repo(&server, "octo/a", "Rust", json!([{ "login": "alice", "contributions": 5 }])).await;

    // octo/b has every endpoint except contributors.
    mount_json(
        &server,
        "/repos/octo/b",
        json!({ "full_name": "octo/b", "created_at": "2023-01-01T00:00:00Z" }),
    )
    .await;
    mount_json(&server, "/repos/octo/b/issues", json!([])).await;
    mount_status(&server, "/repos/octo/b/contributors", 500).await;
    mount_json(&server, "/repos/octo/b/commits", json!([])).await;
    mount_json(&server, "/repos/octo/b/pulls", json!([])).await;

    let bundle = collect(&server, &["octo/a", "octo/b"]).await;

    assert_eq!(
        bundle.outcomes[&id("octo/b")],
        FetchOutcome::PartialFailure {
            missing: BTreeSet::from([ResourceKind::Contributors])
        }
    );
    assert_eq!(bundle.repo_metrics.len(), 2);
    assert_eq!(bundle.contributors.len(), 1);
    assert_eq!(bundle.contributors[0].repo_count, 1);
    assert_eq!(bundle.repo_metrics[1].language, None);
}

#[tokio::test]
async fn test_issue_and_commit_metrics() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/repos/octo/a",
        json!({ "full_name": "octo/a", "created_at": "2022-06-01T12:00:00Z" }),
    )
    .await;
    mount_json(
        &server,
        "/repos/octo/a/issues",
        json!([
            { "number": 1, "state": "open", "created_at": "2024-05-01T00:00:00Z" },
            { "number": 2, "state": "open", "created_at": "2024-05-01T00:00:00Z" },
            { "number": 3, "state": "closed", "created_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-02T00:00:00Z" },
            { "number": 4, "state": "closed", "created_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-03T00:00:00Z" },
            { "number": 5, "state": "closed", "created_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-07T00:00:00Z" },
            { "number": 6, "state": "open", "pull_request": {} }
        ]),
    )
    .await;
    mount_json(&server, "/repos/octo/a/contributors", json!([])).await;
    mount_json(
        &server,
        "/repos/octo/a/commits",
        json!([
            { "sha": "1", "commit": { "committer": { "date": "2024-05-20T08:00:00Z" } } },
            { "sha": "2", "commit": { "committer": { "date": "2024-05-20T18:00:00Z" } } },
            { "sha": "3", "commit": { "committer": { "date": "2024-04-22T12:00:00Z" } } }
        ]),
    )
    .await;
    mount_json(&server, "/repos/octo/a/pulls", json!([])).await;

    let bundle = collect(&server, &["octo/a"]).await;
    let metrics = &bundle.repo_metrics[0];

    assert_eq!(metrics.total_issues, 5);
    assert!((metrics.resolution_rate.unwrap() - 60.0).abs() < 1e-9);
    assert_eq!(metrics.total_commits_fetched_period, Some(3));
    assert_eq!(metrics.monthly_commits_last30d, Some(2));
    assert_eq!(metrics.age_days, 731);

    let stats = bundle.close_time_stats.as_ref().unwrap();
    assert_eq!(stats.count, 3);
    assert!((stats.median - 2.0).abs() < 1e-9);
    assert!(bundle.close_time_trend.is_none());

    assert_eq!(bundle.commit_activity.len(), 2);
    assert_eq!(bundle.commit_activity[1].commits, 2);
    assert_eq!(bundle.config.token, None);
}

#[tokio::test]
async fn test_organization_without_repositories_is_fatal() {
    let server = MockServer::start().await;
    mount_json(&server, "/orgs/empty-org/repos", json!([])).await;

    let result = run_pipeline(&config(&server, &["empty-org"]), now(), &NoProgress).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_rejected_token_is_fatal() {
    let server = MockServer::start().await;
    mount_status(&server, "/user", 401).await;

    let mut config = config(&server, &["octo/a"]);
    config.token = Some("bad-token".into());

    let result = run_pipeline(&config, now(), &NoProgress).await;

    assert!(result.is_err());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers.get("authorization").unwrap(), "token bad-token");
}

#[tokio::test]
async fn test_no_targets_is_fatal() {
    let server = MockServer::start().await;

    let result = run_pipeline(&config(&server, &[" "]), now(), &NoProgress).await;

    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_all_repositories_failing_is_fatal() {
    let server = MockServer::start().await;
    mount_status(&server, "/repos/octo/a", 404).await;

    let result = run_pipeline(&config(&server, &["octo/a"]), now(), &NoProgress).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_disabled_resources_are_not_missing() {
    let server = MockServer::start().await;
    mount_repo(&server, "octo/a", "Rust", json!([{ "login": "alice", "contributions": 5 }])).await;

    let mut config = config(&server, &["octo/a"]);
    config.fetch_contributors = false;
    config.fetch_commits = false;
    config.fetch_pull_requests = false;

    let bundle = run_pipeline(&config, now(), &NoProgress).await.unwrap();

    assert_eq!(bundle.outcomes[&id("octo/a")], FetchOutcome::Success);
    assert!(bundle.contributors.is_empty());
    assert!(bundle.pull_request_metrics.is_empty());
    assert_eq!(bundle.repo_metrics[0].total_commits_fetched_period, None);

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, ["/repos/octo/a", "/repos/octo/a/issues"]);
}

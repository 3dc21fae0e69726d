//! End-to-end runs: manifest file on disk, mock Pingdom API over HTTP.

use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pingdom_gitops::config::ApiSettings;
use pingdom_gitops::error::GitopsError;
use pingdom_gitops::reconcile_file;

fn manifest_file(checks_yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"gitops:
  type: pingdom-checks
  version: 1.0
pingdom:
  tag: team-x
  teams:
    ops: 11
  integrations:
    slack: 21
  default:
    type: http
    resolution: 5
  checks:
{checks_yaml}"#
    )
    .unwrap();
    file
}

fn settings(server: &MockServer) -> ApiSettings {
    ApiSettings::new(server.uri(), "test-token")
}

async fn mount_listing(server: &MockServer, checks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/checks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "checks": checks })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: u64, tags: &[&str]) {
    let tags: Vec<_> = tags.iter().map(|t| json!({"name": t, "type": "u"})).collect();
    Mock::given(method("GET"))
        .and(path(format!("/checks/{id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"check": {"id": id, "tags": tags}})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_empty_directory_creates_check() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/checks"))
        .and(query_param("name", "Example"))
        .and(query_param("host", "example.com"))
        .and(query_param("type", "http"))
        .and(query_param("tags", "team-x,web"))
        .and(query_param("teamids", "11"))
        .and(query_param("integrationids", "21"))
        .and(query_param("resolution", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"check": {"id": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let file = manifest_file(
        r#"    - name: Example
      host: example.com
      tags: [web]
      teamids: [ops]
      integrationids: [slack]
"#,
    );

    let report = reconcile_file(file.path(), settings(&server)).await.unwrap();

    assert_eq!(report.created(), 1);
    assert_eq!(report.updated(), 0);
}

#[tokio::test]
async fn test_matching_check_is_updated_without_type() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([{"id": 42, "hostname": "example.com", "type": "http"}]),
    )
    .await;
    mount_detail(&server, 42, &["team-x"]).await;
    Mock::given(method("PUT"))
        .and(path("/checks/42"))
        .and(query_param("tags", "team-x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = manifest_file(
        r#"    - name: Example
      host: example.com
"#,
    );

    let report = reconcile_file(file.path(), settings(&server)).await.unwrap();
    assert_eq!(report.updated(), 1);

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("update request");
    assert!(put.url.query_pairs().all(|(k, _)| k != "type"));
    assert!(requests.iter().all(|r| r.method.as_str() != "POST"));
}

#[tokio::test]
async fn test_declared_host_matches_case_insensitively() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([{"id": 9, "host": "example.com"}])).await;
    mount_detail(&server, 9, &["team-x"]).await;
    Mock::given(method("PUT"))
        .and(path("/checks/9"))
        .and(query_param("host", "Example.COM"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = manifest_file(
        r#"    - name: Example
      host: Example.COM
"#,
    );

    reconcile_file(file.path(), settings(&server)).await.unwrap();
}

#[tokio::test]
async fn test_failed_update_reported_after_every_check_ran() {
    let server = MockServer::start().await;
    mount_listing(&server, json!([{"id": 1, "hostname": "first.com"}])).await;
    mount_detail(&server, 1, &["team-x"]).await;
    Mock::given(method("PUT"))
        .and(path("/checks/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/checks"))
        .and(query_param("host", "second.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let file = manifest_file(
        r#"    - name: First
      host: first.com
    - name: Second
      host: second.com
"#,
    );

    let err = reconcile_file(file.path(), settings(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, GitopsError::Aggregate { failed_updates: 1 }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_invalid_manifest_makes_no_remote_calls() {
    let server = MockServer::start().await;

    let file = manifest_file(
        r#"    - name: Example
      host: example.com
      teamids: [ghost]
"#,
    );

    let err = reconcile_file(file.path(), settings(&server))
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("ghost"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let file = manifest_file(
        r#"    - name: Example
      host: example.com
"#,
    );

    let err = reconcile_file(file.path(), settings(&server))
        .await
        .unwrap_err();

    match err {
        GitopsError::Transport { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_manifest_file() {
    let server = MockServer::start().await;

    let err = reconcile_file(
        std::path::Path::new("/definitely/not/here.yaml"),
        settings(&server),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GitopsError::ConfigNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

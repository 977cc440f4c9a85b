//! End-to-end tests for `fwsync apply`: the real binary driven against
//! wiremock standing in for both the vendor list endpoint and the
//! provider firewall API.
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn config_toml(base_url: &str) -> String {
    format!(
        r#"
projects = ["acme-prod"]

[provider]
base_url = "{base_url}"

[reconcile]
retry_attempts = 1
"#
    )
}

fn payload_json(endpoint_url: &str) -> String {
    json!({
        "configs": [{
            "rule_name": "allow-vendor-ssh",
            "description": "Vendor SSH access",
            "endpoint_url": endpoint_url,
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
        }]
    })
    .to_string()
}

/// Run the binary on a blocking thread so the mock server keeps serving.
async fn run_apply(config: &Path, payload: &Path) -> std::process::Output {
    let config = config.to_path_buf();
    let payload = payload.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut cmd = cargo_bin_cmd!("fwsync");
        cmd.env("HOME", "/tmp/fwsync-e2e-nonexistent")
            .env("XDG_CONFIG_HOME", "/tmp/fwsync-e2e-nonexistent")
            .env("FWSYNC_TOKEN", "test-token")
            .arg("--config")
            .arg(&config)
            .args(["--output", "json", "apply", "-f"])
            .arg(&payload);
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_creates_missing_rule() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.5/32\n"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/acme-prod/global/firewalls/allow-vendor-ssh"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "not found", "status": "NOT_FOUND" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/acme-prod/global/firewalls"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operation-1", "status": "RUNNING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = temp_file(".toml", &config_toml(&server.uri()));
    let payload = temp_file(".json", &payload_json(&format!("{}/ips.txt", server.uri())));

    let output = run_apply(config.path(), payload.path()).await;

    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"status\": \"created\""), "stdout: {stdout}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_is_idempotent_against_matching_rule() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.5/32\n"))
        .mount(&server)
        .await;

    // The existing rule already matches the desired state. No POST/PUT
    // mock is mounted: any write would 404 and fail the run.
    Mock::given(method("GET"))
        .and(path("/projects/acme-prod/global/firewalls/allow-vendor-ssh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "allow-vendor-ssh",
            "description": "Vendor SSH access",
            "network": "global/networks/default",
            "priority": 1000,
            "direction": "INGRESS",
            "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }],
            "sourceRanges": ["203.0.113.5/32"],
            "fingerprint": "etag-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = temp_file(".toml", &config_toml(&server.uri()));
    let payload = temp_file(".json", &payload_json(&format!("{}/ips.txt", server.uri())));

    let output = run_apply(config.path(), payload.path()).await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"status\": \"unchanged\""), "stdout: {stdout}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_partial_failure_exit_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/good.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.5/32\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/acme-prod/global/firewalls/rule-good"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/acme-prod/global/firewalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "op" })))
        .mount(&server)
        .await;

    let payload_body = json!({
        "configs": [
            {
                "rule_name": "rule-good",
                "description": "",
                "endpoint_url": format!("{}/good.txt", server.uri()),
                "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
            },
            {
                "rule_name": "rule-bad",
                "description": "",
                "endpoint_url": format!("{}/bad.txt", server.uri()),
                "allowed": [{ "IPProtocol": "tcp", "ports": ["22"] }]
            }
        ]
    })
    .to_string();

    let config = temp_file(".toml", &config_toml(&server.uri()));
    let payload = temp_file(".json", &payload_body);

    let output = run_apply(config.path(), payload.path()).await;

    assert_eq!(
        output.status.code(),
        Some(5),
        "partial failure has its own exit code; stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"status\": \"created\""), "stdout: {stdout}");
    assert!(stdout.contains("\"status\": \"failed\""), "stdout: {stdout}");
}

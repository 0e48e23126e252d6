use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

fn cmd() -> Command {
    let mut c = Command::cargo_bin("objection").unwrap();
    c.env_remove("OBJECTION_BASE_URL")
        .env_remove("OBJECTION_TIMEOUT")
        .env_remove("OBJECTION_LOCATION")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(30));
    c
}

/// Answer a single request with `body` and return the backend URL.
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 8192];
        let mut seen = Vec::new();
        // Read until the end of the JSON body.
        while !seen.ends_with(b"}") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}")
}

#[test]
fn blank_query_is_rejected() {
    cmd()
        .args(["--text", "--query", "   "])
        .assert()
        .failure()
        .stderr(contains("Please enter a query or select a demo scenario!"));
}

#[test]
fn json_without_query_is_rejected() {
    cmd()
        .arg("--json")
        .assert()
        .failure()
        .stderr(contains("Please enter a query"));
}

#[test]
fn json_and_text_conflict() {
    cmd()
        .args(["--json", "--text", "--query", "x"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn unreachable_backend_reports_network_error() {
    cmd()
        .args(["--text", "--query", "x", "--base-url", "http://127.0.0.1:1"])
        .assert()
        .code(1)
        .stderr(contains("Cannot connect to backend at http://127.0.0.1:1"))
        .stderr(contains("analysis request failed"));
}

#[test]
fn json_mode_failure_exits_with_message_under_default_logging() {
    cmd()
        .args(["--json", "--query", "x", "--base-url", "http://127.0.0.1:1"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(contains("Cannot connect to backend at http://127.0.0.1:1"));
}

#[test]
fn undecodable_result_is_reported_once() {
    let base = serve_once("<html>maintenance</html>");
    cmd()
        .args(["--text", "--query", "x", "--base-url", &base])
        .assert()
        .code(1)
        .stderr(contains("Error: invalid response from backend"))
        .stderr(contains("Error: Error:").not());
}

#[test]
fn text_mode_prints_alert_before_tabs() {
    let base = serve_once(
        r#"{"triage":{"situation_type":"mental_health_crisis","urgency":"high"},"rights":{"explanation":"You have the right to confidential help."}}"#,
    );
    let assert = cmd()
        .args(["--text", "--query", "I can't go on", "--base-url", &base])
        .assert()
        .success()
        .stdout(contains("988"))
        .stdout(contains("You have the right to confidential help."));
    let out = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let alert_at = out.find("988").unwrap();
    let tabs_at = out.find("[📜 Your Rights]").unwrap();
    assert!(alert_at < tabs_at);
}

#[test]
fn json_mode_exports_document() {
    let base = serve_once(r#"{"document":"To the landlord: please repair the mold."}"#);
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["--json", "--scenario", "landlord-mold", "--base-url", &base])
        .arg("--export-document")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("please repair the mold"));
    let saved = std::fs::read_to_string(dir.path().join("legal_document.txt")).unwrap();
    assert_eq!(saved, "To the landlord: please repair the mold.");
}

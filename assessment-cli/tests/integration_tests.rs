use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::{NamedTempFile, TempDir};

fn assessment(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_assessment"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("Invalid UTF-8");
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

fn template_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "{}", json).expect("Failed to write to temp file");
    file
}

#[test]
fn test_decode_missing_profile() {
    let output = assessment(&["decode"]);
    assert!(output.status.success());

    let view = stdout_json(&output);
    assert_eq!(view["view"], "not_found");
    assert_eq!(view["title"], "Assessment Results Not Found");
    assert_eq!(view["action_href"], "/start");
}

#[test]
fn test_decode_invalid_profile_logs_diagnostic() {
    let output = assessment(&["decode", "%7Bnot%20valid%20json"]);
    assert!(output.status.success());

    let view = stdout_json(&output);
    assert_eq!(view["view"], "error_loading");
    assert_eq!(view["title"], "Error Loading Results");
    assert_eq!(view["action_href"], "/start");

    let stderr = String::from_utf8(output.stderr).expect("Invalid UTF-8");
    assert!(stderr.contains("failed to parse profile payload"));
}

#[test]
fn test_decode_valid_profile_from_query() {
    let output = assessment(&["decode", "--query", "/results?profile=%7B%22score%22%3A42%7D"]);
    assert!(output.status.success());

    let view = stdout_json(&output);
    assert_eq!(view, serde_json::json!({"view": "results", "profile": {"score": 42}}));
}

#[test]
fn test_decode_strict_exit_code() {
    let output = assessment(&["decode", "--strict", "%ZZ"]);
    assert_eq!(output.status.code(), Some(2));

    let output = assessment(&["decode", "--strict", "%7B%7D"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_encode_link_round_trips_through_decode() {
    let profile = template_file(r#"{"score": 42, "stage": "growth"}"#);
    let output = assessment(&["encode", "--link", "-i", profile.path().to_str().unwrap()]);
    assert!(output.status.success());

    let link = String::from_utf8(output.stdout).expect("Invalid UTF-8");
    let link = link.trim();
    assert!(link.starts_with("/results?profile=%7B"));

    let output = assessment(&["decode", "--query", link]);
    let view = stdout_json(&output);
    assert_eq!(view["profile"], serde_json::json!({"score": 42, "stage": "growth"}));
}

#[test]
fn test_encode_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_assessment"))
        .arg("encode")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn child process");

    child
        .stdin
        .take()
        .expect("Failed to open stdin")
        .write_all(br#"{"score": 42}"#)
        .expect("Failed to write to stdin");

    let output = child.wait_with_output().expect("Failed to read stdout");
    let stdout = String::from_utf8(output.stdout).expect("Invalid UTF-8");
    assert_eq!(stdout.trim(), "%7B%22score%22%3A42%7D");
}

#[test]
fn test_select_then_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = dir.path().join("handoff.json");
    let store = store.to_str().unwrap();
    let template = template_file(r#"{"id": "t-123", "name": "Subscription Ladder"}"#);

    let output = assessment(&["select", "-i", template.path().to_str().unwrap(), "--store", store]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("Invalid UTF-8");
    assert_eq!(stdout.trim(), "/money-model?template=t-123");

    let output = assessment(&["load", "--store", store, "--query", "?template=t-999"]);
    assert!(!output.status.success());

    let output = assessment(&["load", "--store", store, "--query", "?template=t-123", "--consume"]);
    assert!(output.status.success());
    let loaded = stdout_json(&output);
    assert_eq!(loaded, serde_json::json!({"id": "t-123", "name": "Subscription Ladder"}));

    let output = assessment(&["load", "--store", store, "--query", "?template=t-123"]);
    assert!(!output.status.success());
}

#[test]
fn test_select_rejects_unsafe_id() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = dir.path().join("handoff.json");
    let template = template_file(r#"{"id": "a b"}"#);

    let output = assessment(&[
        "select",
        "-i",
        template.path().to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!store.exists());
}

#[test]
fn test_config_overrides_builder_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = dir.path().join("handoff.json");
    let config = template_file(r#"{"builder_path": "/builder", "storage_key": "picked"}"#);
    let template = template_file(r#"{"id": "t-1"}"#);

    let output = assessment(&[
        "--config",
        config.path().to_str().unwrap(),
        "select",
        "-i",
        template.path().to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("Invalid UTF-8");
    assert_eq!(stdout.trim(), "/builder?template=t-1");

    let slots: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert!(slots.get("picked").is_some());
}

//! Basic CLI E2E tests.
//!
//! Tests invoke the compiled binary with HOME pointed at a scratch
//! directory so the real config is never touched.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use mockito::Matcher;
use tempfile::TempDir;

const TOKEN: &str = "3f1c2a9e-0d4b-4a51-9a55-6f5e0c1d2b7a";

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, envs: &[(&str, &str)], args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_daytick"))
        .args(args)
        .env("HOME", home)
        .env_remove("DAYTICK_ENV")
        .env_remove("DAYTICK_BASE_URL")
        .env_remove("DAYTICK_SESSION_TOKEN")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command with `input` piped to stdin.
fn run_cli_with_input(
    home: &Path,
    envs: &[(&str, &str)],
    args: &[&str],
    input: &[u8],
) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_daytick"))
        .args(args)
        .env("HOME", home)
        .env_remove("DAYTICK_ENV")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");

    let mut stdin = child.stdin.take().expect("stdin is piped");
    stdin.write_all(input).expect("Failed to write stdin");
    drop(stdin);

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &[], &["--help"]);
    assert_eq!(code, 0);
    for command in ["calendar", "task", "search", "settings", "config", "completions"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_config_path_and_defaults() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &[], &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/daytick/config.toml"));

    let (stdout, _, code) = run_cli(home.path(), &[], &["config", "get", "server.base_url"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "http://localhost:3000");
    assert!(home.path().join(".config/daytick/config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &[], &["config", "set", "search.page_size", "25"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(home.path(), &[], &["config", "set", "server.session_token", TOKEN]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &[], &["config", "list"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["search"]["page_size"], 25);
    assert_eq!(json["server"]["session_token"], TOKEN);
}

#[test]
fn test_config_get_unset_value_prints_nothing() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &[], &["config", "get", "server.session_token"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty(), "stdout: {stdout:?}");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &[],
        &["config", "set", "server.session_token", "not-a-uuid"],
    );
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    let (_, _, code) = run_cli(home.path(), &[], &["config", "get", "server.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_calendar_json_against_server() {
    let mut server = mockito::Server::new();
    let me = server
        .mock("GET", "/api/me")
        .match_header("cookie", format!("session_token={TOKEN}").as_str())
        .with_status(200)
        .with_body(r#"{"start_of_week":7,"rollover_time":"00:00"}"#)
        .create();
    let tasks = server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"id":5,"title":"dentist","planned_at":"2024-02-20","completed":false,"created_at":"2024-01-01T00:00:00Z"}]"#,
        )
        .expect_at_least(2)
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[("DAYTICK_BASE_URL", &url), ("DAYTICK_SESSION_TOKEN", TOKEN)],
        &["calendar", "--date", "2024-02-15", "--json"],
    );
    assert_eq!(code, 0, "calendar failed: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["title"], "February 2024");
    assert_eq!(json["start_of_week"], 7);
    assert_eq!(json["weeks"][0][0]["date"], "2024-01-28");
    let day = json["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|w| w.as_array().unwrap())
        .find(|d| d["date"] == "2024-02-20")
        .unwrap();
    assert_eq!(day["tasks"][0]["title"], "dentist");

    me.assert();
    tasks.assert();
}

#[test]
fn test_task_get_reports_server_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tasks/99")
        .with_status(404)
        .with_body(r#"{"error":"task not found"}"#)
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let (_, stderr, code) = run_cli(
        home.path(),
        &[("DAYTICK_BASE_URL", &url)],
        &["task", "get", "99"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("task not found"), "stderr: {stderr}");
}

fn mock_calendar_reads(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", "/api/me")
        .with_status(200)
        .with_body(r#"{"start_of_week":1,"rollover_time":"00:00"}"#)
        .create();
    server
        .mock("GET", "/api/tasks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"id":5,"title":"dentist","planned_at":"2024-02-20","completed":false,"created_at":"2024-01-01T00:00:00Z"}]"#,
        )
        .create();
}

#[test]
fn test_watch_sends_mutations_typed_before_quit() {
    let mut server = mockito::Server::new();
    mock_calendar_reads(&mut server);
    let patch = server
        .mock("PATCH", "/api/tasks/5")
        .match_header("cookie", format!("session_token={TOKEN}").as_str())
        .match_body(Matcher::Json(serde_json::json!({"completed": true})))
        .with_status(200)
        .with_body(
            r#"{"id":5,"title":"dentist","planned_at":"2024-02-20","completed":true,"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .expect(1)
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let (stdout, stderr, code) = run_cli_with_input(
        home.path(),
        &[("DAYTICK_BASE_URL", &url), ("DAYTICK_SESSION_TOKEN", TOKEN)],
        &["calendar", "watch", "--date", "2024-02-15"],
        b"done 5\nquit\n",
    );
    assert_eq!(code, 0, "watch failed: {stderr}");
    assert!(stdout.contains("February 2024"));
    patch.assert();
}

#[test]
fn test_watch_sends_delete_when_input_ends() {
    let mut server = mockito::Server::new();
    mock_calendar_reads(&mut server);
    let delete = server
        .mock("DELETE", "/api/tasks/5")
        .with_status(204)
        .expect(1)
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let (_, stderr, code) = run_cli_with_input(
        home.path(),
        &[("DAYTICK_BASE_URL", &url), ("DAYTICK_SESSION_TOKEN", TOKEN)],
        &["calendar", "watch", "--date", "2024-02-15", "--json"],
        b"delete 5\n",
    );
    assert_eq!(code, 0, "watch failed: {stderr}");
    delete.assert();
}

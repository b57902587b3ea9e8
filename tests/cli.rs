use std::path::Path;
use std::time::Duration;

use assert_cmd::Command;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BIN: &str = "claude-subscription-usage";
const USAGE_PATH: &str = "/api/oauth/usage";
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/api/oauth/usage";

/// Command isolated from the user's real credentials and environment.
fn command(config_dir: &Path, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.env("HOME", config_dir)
        .env("CLAUDE_CONFIG_DIR", config_dir)
        .env("CLAUDE_USAGE_API_URL", api_url)
        .env_remove("CLAUDE_USAGE_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    cmd
}

fn usage_url(server: &MockServer) -> String {
    format!("{}{USAGE_PATH}", server.uri())
}

fn write_credentials(dir: &Path) {
    std::fs::write(
        dir.join(".credentials.json"),
        r#"{"claudeAiOauth":{"accessToken":"sk-ant-oat01-test","refreshToken":"r","expiresAt":0}}"#,
    )
    .unwrap();
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().clone();
    String::from_utf8(output.stdout).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn help_prints_usage_without_network() {
    let dir = TempDir::new().unwrap();
    write_credentials(dir.path());
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for flag in ["--help", "-h"] {
        let stdout = stdout_of(command(dir.path(), &usage_url(&server)).arg(flag));
        assert!(stdout.contains("Usage:"), "{stdout}");
        assert!(stdout.contains("--session"));
        assert!(stdout.contains("--no-bars"));
    }
}

#[test]
fn invalid_arguments_print_placeholder() {
    let dir = TempDir::new().unwrap();
    command(dir.path(), UNREACHABLE_URL)
        .args(["--timeout", "soon"])
        .assert()
        .success()
        .stdout("N/A\n")
        .stderr("");
}

// macOS consults the real login keychain before the credentials file.
#[cfg(not(target_os = "macos"))]
#[test]
fn missing_credentials_print_placeholder() {
    let dir = TempDir::new().unwrap();
    command(dir.path(), UNREACHABLE_URL)
        .args(["--week", "--24h"])
        .assert()
        .success()
        .stdout("N/A\n")
        .stderr("");
}

#[cfg(not(target_os = "macos"))]
#[test]
fn debug_reports_failure_on_stderr() {
    let dir = TempDir::new().unwrap();
    let output = command(dir.path(), UNREACHABLE_URL)
        .arg("--debug")
        .assert()
        .success()
        .stdout("N/A\n")
        .get_output()
        .clone();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No Claude credentials found"), "{stderr}");
}

#[cfg(not(target_os = "macos"))]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_prints_placeholder() {
    let dir = TempDir::new().unwrap();
    write_credentials(dir.path());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    command(dir.path(), &usage_url(&server))
        .args(["--timeout", "300"])
        .assert()
        .success()
        .stdout("N/A\n");
}

#[cfg(not(target_os = "macos"))]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_line_with_custom_label() {
    let dir = TempDir::new().unwrap();
    write_credentials(dir.path());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USAGE_PATH))
        .and(header("authorization", "Bearer sk-ant-oat01-test"))
        .and(header("anthropic-beta", "oauth-2025-04-20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "five_hour": {"utilization": 71.0, "resets_at": null},
            "seven_day": {"utilization": 20.0, "resets_at": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = stdout_of(command(dir.path(), &usage_url(&server)).args(["--session", "Now"]));

    assert!(stdout.starts_with("\x1b[37mNow: "), "{stdout:?}");
    assert!(stdout.contains("\x1b[33m71.0%"));
    assert!(stdout.ends_with("(N/A)\x1b[0m\n"));
    assert_eq!(stdout.lines().count(), 1);
}

#[cfg(not(target_os = "macos"))]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_and_repeated_flags_still_render() {
    let dir = TempDir::new().unwrap();
    write_credentials(dir.path());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "five_hour": {"utilization": 10.0, "resets_at": null},
            "seven_day": {"utilization": 95.0, "resets_at": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = stdout_of(command(dir.path(), &usage_url(&server)).args([
        "--week",
        "--session",
        "--powerline",
        "--text-color=white",
        "--text-color=mid-grey",
        "--no-bars",
    ]));

    assert_eq!(stdout, "\x1b[97mWeek: \x1b[31m95.0%\x1b[97m (N/A)\x1b[0m\n");
}

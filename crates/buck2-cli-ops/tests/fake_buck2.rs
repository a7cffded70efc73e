//! Runs the operations against a shell script standing in for `buck2`.

#![cfg(unix)]

use buck2_cli_ops::{
    attributes, providers, status, targets, Buck2CliOpsError, Buck2CommandRunner, TargetQuery,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FAKE_BUCK2: &str = r#"#!/bin/sh
case "$*" in
  *//missing:*)
    echo "Error: Unknown target \`x\` from package \`root//missing\`" >&2
    exit 2
    ;;
  *//crash:*)
    echo "partial output"
    echo "buck2 daemon crashed" >&2
    exit 7
    ;;
  *//badconfig:*)
    echo "Error: parse error in .buckconfig line 3" >&2
    exit 3
    ;;
  *//slow:*)
    echo $$ > slow.pid
    exec sleep 30
    ;;
  *//garbled:*)
    echo "this is not json"
    exit 0
    ;;
esac

case "$1" in
  status)
    printf '{"cwd":"%s","process_info":{"pid":4242}}\n' "$(pwd)"
    ;;
  targets)
    shift
    printf '%s\n' "$@"
    ;;
  cquery)
    printf '{"root//app:server":{"name":"server","args":"%s"}}\n' "$*"
    ;;
  audit)
    echo "Providers([DefaultInfo(), RunInfo()]) for $*"
    ;;
  *)
    echo "unknown subcommand $1" >&2
    exit 1
    ;;
esac
"#;

/// The script is written once per test binary so no test ever execs a file
/// another thread still holds open for writing.
fn fake_buck2() -> &'static Path {
    static SCRIPT: OnceLock<(TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = SCRIPT.get_or_init(|| {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("buck2");
        std::fs::write(&path, FAKE_BUCK2).expect("failed to write fake buck2");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake buck2");
        (dir, path)
    });
    path
}

fn runner() -> Buck2CommandRunner {
    Buck2CommandRunner::with_executable(&fake_buck2().to_string_lossy())
}

#[tokio::test]
async fn status_parses_json_and_runs_in_working_dir() {
    let project = TempDir::new().unwrap();

    let result = status(&runner(), project.path()).await.unwrap();

    assert_eq!(result["process_info"]["pid"], 4242);
    let cwd = PathBuf::from(result["cwd"].as_str().unwrap());
    assert_eq!(
        cwd.canonicalize().unwrap(),
        project.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn targets_returns_one_entry_per_line() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//app/...").host("linux").mode("mode/dev");

    let result = targets(&runner(), project.path(), &query).await.unwrap();

    // The fake echoes its arguments back, one per line.
    assert_eq!(
        result,
        vec!["@mode/dev", "//app/...", "--fake-host", "linux"]
    );
}

#[tokio::test]
async fn attributes_parses_cquery_json() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//app:server");

    let result = attributes(&runner(), project.path(), &query).await.unwrap();

    let entry = &result["root//app:server"];
    assert_eq!(entry["name"], "server");
    assert!(entry["args"]
        .as_str()
        .unwrap()
        .contains("--output-all-attributes --json"));
}

#[tokio::test]
async fn attributes_rejects_non_json_output() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//garbled:x");

    let err = attributes(&runner(), project.path(), &query)
        .await
        .unwrap_err();
    assert!(matches!(err, Buck2CliOpsError::ParseError { .. }));
}

#[tokio::test]
async fn providers_returns_raw_text() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//app:server");

    let result = providers(&runner(), project.path(), &query).await.unwrap();

    assert_eq!(result.target, "//app:server");
    assert!(result.output.starts_with("Providers([DefaultInfo(), RunInfo()])"));
    assert!(result.output.contains("providers //app:server"));
}

#[tokio::test]
async fn unknown_target_is_classified() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//missing:x");

    let err = targets(&runner(), project.path(), &query).await.unwrap_err();
    assert_eq!(err.code(), "invalid_target");
}

#[tokio::test]
async fn generic_failure_keeps_exit_code_and_output() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//crash:x");

    let err = providers(&runner(), project.path(), &query).await.unwrap_err();
    match err {
        Buck2CliOpsError::CommandFailed {
            exit_code,
            stderr,
            stdout,
            ..
        } => {
            assert_eq!(exit_code, Some(7));
            assert_eq!(stderr, "buck2 daemon crashed");
            assert_eq!(stdout, "partial output");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_executable_is_not_installed() {
    // Initialise the shared script before this test forks anything.
    fake_buck2();
    let project = TempDir::new().unwrap();
    let runner = Buck2CommandRunner::with_executable("/definitely/not/here/buck2");

    let err = status(&runner, project.path()).await.unwrap_err();
    assert_eq!(err.code(), "buck2_not_installed");
}

#[tokio::test]
async fn malformed_buckconfig_is_not_a_missing_project() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//badconfig:x");

    let err = targets(&runner(), project.path(), &query).await.unwrap_err();

    assert_eq!(err.code(), "command_failed");
    let details = err.details();
    assert_eq!(details["exit_code"], 3);
    assert_eq!(details["stderr"], "Error: parse error in .buckconfig line 3");
}

/// True once `pid` has exited (reaped or zombie).
fn process_gone(pid: &str) -> bool {
    let output = std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", pid])
        .output()
        .unwrap();
    let stat = String::from_utf8_lossy(&output.stdout);
    !output.status.success() || stat.trim().is_empty() || stat.trim().starts_with('Z')
}

#[tokio::test]
async fn slow_command_times_out_and_is_killed() {
    let project = TempDir::new().unwrap();
    let query = TargetQuery::new("//slow:x");
    let runner = runner().timeout_secs(1);

    let started = Instant::now();
    let err = targets(&runner, project.path(), &query).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(
        err,
        Buck2CliOpsError::Timeout {
            timeout_secs: 1,
            ..
        }
    ));
    assert_eq!(err.code(), "timeout");
    assert_eq!(err.details()["timeout_secs"], 1);

    let pid = std::fs::read_to_string(project.path().join("slow.pid")).unwrap();
    let pid = pid.trim();
    for _ in 0..100 {
        if process_gone(pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("buck2 process {pid} still running after timeout");
}

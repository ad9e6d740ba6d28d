//! Integration tests for `claude_hooks`.
//!
//! These run the real binary, so they exercise file locking across
//! processes rather than threads.

use claude_hooks::{EventLogger, LogEntry, VERSION};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_claude-hooks");

fn spawn_hook(project: &Path, hook: &str, stdin: &str) -> Child {
    let mut child = Command::new(BIN)
        .arg(hook)
        .env("CLAUDE_PROJECT_DIR", project)
        .env_remove("CLAUDE_HOOKS_LOG_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child
}

fn run_hook(project: &Path, hook: &str, stdin: &str) -> Output {
    spawn_hook(project, hook, stdin).wait_with_output().unwrap()
}

fn combined_log(project: &Path) -> Vec<LogEntry> {
    let path = EventLogger::new(project.join(".claude/logs")).log_path("", false);
    let content = std::fs::read_to_string(path).unwrap();
    content.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

#[test]
fn test_version_command() {
    let output = Command::new(BIN).arg("version").output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.trim(), format!("claude-hooks v{VERSION}"));
}

#[test]
fn test_concurrent_processes_write_intact_lines() {
    const PROCESSES: usize = 12;
    let project = TempDir::new().unwrap();
    let filler = "x".repeat(16 * 1024);

    let children: Vec<Child> = (0..PROCESSES)
        .map(|i| {
            let input = serde_json::json!({
                "tool": {"name": "Bash", "parameters": {"command": format!("echo {i}")}},
                "filler": filler,
            });
            spawn_hook(project.path(), "pre-tool-use", &input.to_string())
        })
        .collect();
    for child in children {
        let output = child.wait_with_output().unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    let entries = combined_log(project.path());
    assert_eq!(entries.len(), PROCESSES);
    let commands: HashSet<String> = entries
        .iter()
        .map(|e| {
            assert_eq!(e.hook, "pre_tool_use");
            assert_eq!(e.data["filler"].as_str().unwrap().len(), filler.len());
            e.data["tool"]["parameters"]["command"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(commands.len(), PROCESSES);
    let pids: HashSet<u32> = entries.iter().map(|e| e.pid).collect();
    assert_eq!(pids.len(), PROCESSES);
}

#[test]
fn test_sensitive_prompt_blocks_with_exit_code() {
    let project = TempDir::new().unwrap();

    let output = run_hook(project.path(), "user-prompt-submit", r#"{"prompt": "my api_key is 42"}"#);

    assert_eq!(output.status.code(), Some(1));
    let entries = combined_log(project.path());
    assert_eq!(entries.last().unwrap().data["blocked_prompt"], true);
}

#[test]
fn test_malformed_input_never_blocks() {
    let project = TempDir::new().unwrap();

    let output = run_hook(project.path(), "stop", "{{{");

    assert!(output.status.success());
    let entries = combined_log(project.path());
    assert_eq!(entries[0].data["type"], "stop_error");
}

#[test]
fn test_unwritable_log_dir_reports_diagnostic() {
    let project = TempDir::new().unwrap();
    // A regular file where the log directory should be.
    std::fs::create_dir_all(project.path().join(".claude")).unwrap();
    std::fs::write(project.path().join(".claude/logs"), "").unwrap();

    let output = run_hook(project.path(), "notification", "{}");

    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let first: serde_json::Value = serde_json::from_str(stderr.lines().next().unwrap()).unwrap();
    assert_eq!(first["error"], "logging_failed");
    assert_eq!(first["original_hook"], "notification");
}

//! `SessionStart` hook.
//!
//! Runs when a session starts, resumes, or is cleared. Records the initial
//! session state, including what kind of project this is and which tools are
//! installed. On resume, the most recent pre-compact backup is merged in.

use super::{typed_input, HookContext, HookOutcome};
use crate::error::Result;
use crate::traits::CommandRunner;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::SystemTime;

const SOURCE: &str = "session_start";

/// Manifest files that identify the project type, in priority order.
const PROJECT_MANIFESTS: &[&str] =
    &["package.json", "pyproject.toml", "Cargo.toml", "go.mod", "composer.json", "pom.xml"];

/// Input provided to `SessionStart` hooks.
#[derive(Debug, Default, Deserialize)]
struct SessionStartInput {
    /// "startup", "resume", or "clear".
    #[serde(default, rename = "type")]
    session_type: Option<String>,
}

/// Facts about the project gathered from the filesystem.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectContext {
    /// The first manifest file found, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<&'static str>,
    /// Whether a `CLAUDE.md` exists.
    pub has_claude_config: bool,
    /// Whether the project is a git repository.
    pub is_git_repo: bool,
}

/// Which external tools the session can rely on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    /// `uv` is installed.
    pub uv_available: bool,
    /// `git` is installed.
    pub git_available: bool,
    /// `cargo` is installed.
    pub cargo_available: bool,
}

/// Session settings derived from the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct SessionSettings {
    logging_enabled: bool,
    backup_enabled: bool,
    security_checks: bool,
    performance_monitoring: bool,
    git_integration: bool,
    claude_config_detected: bool,
}

impl SessionSettings {
    const fn for_project(project: &ProjectContext) -> Self {
        Self {
            logging_enabled: true,
            backup_enabled: true,
            security_checks: true,
            performance_monitoring: true,
            git_integration: project.is_git_repo,
            claude_config_detected: project.has_claude_config,
        }
    }
}

/// Run the session start hook.
///
/// # Errors
///
/// Returns an error if the input has the wrong shape.
pub fn run_session_start(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let parsed: SessionStartInput = typed_input(input)?;
    let session_type = parsed.session_type.unwrap_or_else(|| "startup".to_string());

    let now = ctx.now();
    let mut state = Map::new();
    state.insert("session_id".into(), json!(format!("session_{}", now.format("%Y%m%d_%H%M%S"))));
    state.insert("start_time".into(), json!(now.to_rfc3339()));
    state.insert("session_type".into(), json!(session_type));
    state.insert("tools_used".into(), json!([]));
    state.insert("files_accessed".into(), json!([]));
    state.insert("tasks_completed".into(), json!(0));

    if session_type == "resume" {
        state.extend(load_latest_backup(&ctx.backup_dir()));
    }

    let project = detect_project_context(&ctx.project_dir);
    let system = check_system_requirements(ctx.runner());
    let settings = SessionSettings::for_project(&project);
    state.insert("project_context".into(), serde_json::to_value(&project)?);
    state.insert("system_status".into(), serde_json::to_value(system)?);
    state.insert("settings".into(), serde_json::to_value(settings)?);

    ctx.log(SOURCE, &json!({ "session_initialized": state }));
    ctx.log(
        SOURCE,
        &json!({
            "welcome": {
                "session_type": session_type,
                "project_context": project,
                "system_status": system,
                "message": format!("Session started: {session_type}"),
            }
        }),
    );

    Ok(HookOutcome::proceed())
}

/// Inspect the project directory for manifests, `CLAUDE.md`, and `.git`.
#[must_use]
pub fn detect_project_context(project_dir: &Path) -> ProjectContext {
    ProjectContext {
        project_type: PROJECT_MANIFESTS.iter().copied().find(|name| project_dir.join(name).exists()),
        has_claude_config: project_dir.join("CLAUDE.md").exists(),
        is_git_repo: project_dir.join(".git").exists(),
    }
}

/// Check which external tools are installed.
pub fn check_system_requirements(runner: &dyn CommandRunner) -> SystemStatus {
    SystemStatus {
        uv_available: runner.is_available("uv"),
        git_available: runner.is_available("git"),
        cargo_available: runner.is_available("cargo"),
    }
}

/// Load the most recently modified `session_backup_*.json` as an object.
///
/// Missing directories, unreadable files, and non-object backups all yield
/// an empty map.
fn load_latest_backup(backup_dir: &Path) -> Map<String, Value> {
    let Ok(entries) = std::fs::read_dir(backup_dir) else {
        return Map::new();
    };

    let latest = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with("session_backup_") && name.ends_with(".json")
        })
        .map(|e| {
            let modified = e.metadata().and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, e.path())
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let Some((_, path)) = latest else {
        return Map::new();
    };

    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

//! Path utilities for determining where hook data is stored.
//!
//! Logs live under the project directory (`.claude/logs` by default) so they
//! sit next to the hook configuration. The project directory comes from the
//! `CLAUDE_PROJECT_DIR` variable the host sets for hook processes.

use crate::config::HooksConfig;
use std::path::{Path, PathBuf};

/// Environment variable the host uses to pass the project root to hooks.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "CLAUDE_HOOKS_LOG_DIR";

/// Default log directory, relative to the project root.
pub const DEFAULT_LOG_DIR: &str = ".claude/logs";

/// Name of the session backup directory inside the log directory.
pub const BACKUP_DIR_NAME: &str = "backups";

/// Get the project directory for this hook invocation.
///
/// Returns the value of `CLAUDE_PROJECT_DIR` when set and non-empty,
/// otherwise the current directory.
#[must_use]
pub fn project_dir() -> PathBuf {
    match std::env::var_os(PROJECT_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// Resolve the log directory for a project.
///
/// Precedence: `CLAUDE_HOOKS_LOG_DIR`, then `log_dir` from the config, then
/// [`DEFAULT_LOG_DIR`]. Relative paths are resolved against `project_dir`
/// and a leading `~/` expands to the home directory.
#[must_use]
pub fn log_dir(project_dir: &Path, config: &HooksConfig) -> PathBuf {
    let configured = std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| config.log_dir.clone())
        .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());
    resolve(project_dir, &configured)
}

/// Get the session backup directory for a log directory.
#[must_use]
pub fn backup_dir(log_dir: &Path) -> PathBuf {
    log_dir.join(BACKUP_DIR_NAME)
}

fn resolve(project_dir: &Path, configured: &str) -> PathBuf {
    if let Some(rest) = configured.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

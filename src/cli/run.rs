//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{Cli, Command};
use crate::config::{self, HooksConfig};
use crate::hook_logging::EventLogger;
use crate::hooks::{run_hook, HookContext, HookEvent};
use crate::paths;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    fn success(stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self { exit_code: ExitCode::SUCCESS, stdout, stderr }
    }

    fn failure(message: String) -> Self {
        Self { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
    }
}

/// Run a CLI command for the project in `CLAUDE_PROJECT_DIR` (or `.`).
pub fn run(cli: Cli, stdin: &str) -> CliOutput {
    run_in(&paths::project_dir(), cli, stdin)
}

/// Run a CLI command for an explicit project directory.
pub fn run_in(project_dir: &Path, cli: Cli, stdin: &str) -> CliOutput {
    let Cli { log_dir, command } = cli;

    if let Some(event) = command.hook_event() {
        return run_hook_cmd(project_dir, log_dir, event, stdin);
    }

    match command {
        Command::Version => run_version(),
        Command::EnsureConfig => run_ensure_config(project_dir),
        Command::LogPath { source } => run_log_path(project_dir, log_dir, source.as_deref()),
        // Hook commands were dispatched above.
        _ => CliOutput::success(vec![], vec![]),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput::success(vec![], vec![format!("claude-hooks v{}", crate::VERSION)])
}

fn run_ensure_config(project_dir: &Path) -> CliOutput {
    match config::ensure_config_in(project_dir) {
        Ok((config, created)) => {
            let path = HooksConfig::config_path(project_dir);
            let mut messages = vec![if created {
                format!("Created {}", path.display())
            } else {
                format!("Config ensured at {}", path.display())
            }];
            messages.push(format!(
                "  log_dir: {}",
                config.log_dir.as_deref().unwrap_or(paths::DEFAULT_LOG_DIR)
            ));
            messages.push(format!("  separate_files: {}", config.separate_files));
            CliOutput::success(vec![], messages)
        }
        Err(e) => CliOutput::failure(format!("Error ensuring config: {e}")),
    }
}

fn run_log_path(project_dir: &Path, log_dir: Option<PathBuf>, source: Option<&str>) -> CliOutput {
    let (config, warning) = HooksConfig::load_or_default(project_dir);
    let logger = log_dir.map_or_else(
        || EventLogger::for_project(project_dir, &config),
        EventLogger::new,
    );
    let path = logger.log_path(source.unwrap_or(""), source.is_some());
    CliOutput::success(vec![path.display().to_string()], warning.into_iter().collect())
}

// === Hook Commands ===

fn run_hook_cmd(
    project_dir: &Path,
    log_dir: Option<PathBuf>,
    event: HookEvent,
    stdin: &str,
) -> CliOutput {
    let (config, warning) = HooksConfig::load_or_default(project_dir);
    let mut ctx = HookContext::new(project_dir, config);
    if let Some(dir) = log_dir {
        ctx = ctx.with_log_dir(dir);
    }

    let outcome = run_hook(event, stdin, &ctx);

    CliOutput {
        exit_code: exit_code_from_i32(outcome.exit_code),
        stdout: outcome.stdout.into_iter().collect(),
        stderr: warning.into_iter().collect(),
    }
}

fn exit_code_from_i32(code: i32) -> ExitCode {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let code_u8 = if code < 0 {
        1u8
    } else if code > 255 {
        255u8
    } else {
        code as u8
    };
    ExitCode::from(code_u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(exit_code_from_i32(0), ExitCode::SUCCESS);
        assert_eq!(exit_code_from_i32(1), ExitCode::from(1));
        assert_eq!(exit_code_from_i32(-3), ExitCode::from(1));
        assert_eq!(exit_code_from_i32(300), ExitCode::from(255));
    }
}

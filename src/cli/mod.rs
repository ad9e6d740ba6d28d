//! Command-line interface for claude-hooks.
//!
//! Hook commands are registered with the host and receive one JSON object on
//! stdin. The remaining commands are utilities for setting a project up.

mod run;


pub use run::{run, run_in, CliOutput};

use crate::hooks::HookEvent;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lifecycle hooks for Claude Code that keep a JSON-lines event log.
///
/// Register the hook commands in `.claude/settings.json`; every invocation
/// appends to `.claude/logs/hooks_<YYYYMMDD>.log` in the project directory.
#[derive(Parser, Debug)]
#[command(name = "claude-hooks")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Write logs to this directory instead of the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    // === Utility Commands ===
    /// Show version information.
    Version,

    /// Ensure config file exists (create with defaults if not).
    #[command(name = "ensure-config")]
    EnsureConfig,

    /// Print the path of today's log file.
    #[command(name = "log-path")]
    LogPath {
        /// Print the per-source file for this hook source instead
        #[arg(long)]
        source: Option<String>,
    },

    // === Hook Commands (receive JSON from stdin) ===
    /// Run the session start hook (stdin: JSON hook input).
    #[command(name = "session-start", hide = true)]
    SessionStart,

    /// Run the pre-tool-use hook (stdin: JSON hook input).
    ///
    /// Exits 1 to block the tool call. May print a modified tool call.
    #[command(name = "pre-tool-use", hide = true)]
    PreToolUse,

    /// Run the post-tool-use hook (stdin: JSON hook input).
    #[command(name = "post-tool-use", hide = true)]
    PostToolUse,

    /// Run the user prompt submit hook (stdin: JSON hook input).
    ///
    /// Exits 1 to block the prompt. May print a modified prompt.
    #[command(name = "user-prompt-submit", hide = true)]
    UserPromptSubmit,

    /// Run the notification hook (stdin: JSON hook input).
    #[command(hide = true)]
    Notification,

    /// Run the stop hook (stdin: JSON hook input).
    #[command(hide = true)]
    Stop,

    /// Run the subagent stop hook (stdin: JSON hook input).
    #[command(name = "subagent-stop", hide = true)]
    SubagentStop,

    /// Run the pre-compact hook (stdin: JSON hook input).
    ///
    /// Exits 1 to refuse compaction.
    #[command(name = "pre-compact", hide = true)]
    PreCompact,
}

impl Command {
    /// Returns true if this command requires stdin input.
    #[must_use]
    pub const fn needs_stdin(&self) -> bool {
        self.is_hook()
    }

    /// Returns true if this is a hook command (invoked by the host).
    #[must_use]
    pub const fn is_hook(&self) -> bool {
        self.hook_event().is_some()
    }

    /// The hook event this command runs, or None for utility commands.
    #[must_use]
    pub const fn hook_event(&self) -> Option<HookEvent> {
        match self {
            Self::SessionStart => Some(HookEvent::SessionStart),
            Self::PreToolUse => Some(HookEvent::PreToolUse),
            Self::PostToolUse => Some(HookEvent::PostToolUse),
            Self::UserPromptSubmit => Some(HookEvent::UserPromptSubmit),
            Self::Notification => Some(HookEvent::Notification),
            Self::Stop => Some(HookEvent::Stop),
            Self::SubagentStop => Some(HookEvent::SubagentStop),
            Self::PreCompact => Some(HookEvent::PreCompact),
            Self::Version | Self::EnsureConfig | Self::LogPath { .. } => None,
        }
    }
}

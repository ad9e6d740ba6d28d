//! # `claude_hooks`
//!
//! Lifecycle hooks for Claude Code and the date-partitioned event log they
//! write to.
//!
//! The heart of the crate is [`log_event`]: append one JSON line describing a
//! hook event to `hooks_<YYYYMMDD>.log` (or a per-source file) under the log
//! directory, holding an exclusive file lock so concurrent hook processes
//! never interleave. The [`hooks`] module builds the individual hook handlers
//! on top of it.

#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod hook_logging;
pub mod hooks;
pub mod paths;
pub mod testing;
pub mod traits;

pub use command::RealCommandRunner;
pub use config::HooksConfig;
pub use error::{Error, Result};
pub use hook_logging::{log_event, EventLogger, LogEntry};
pub use hooks::{run_hook, HookContext, HookEvent, HookOutcome, BLOCK_EXIT_CODE};
pub use traits::{Clock, CommandRunner, SystemClock, ToolDecision, ToolPolicy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

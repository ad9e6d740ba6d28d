//! Core traits for testability and abstraction.

use chrono::{DateTime, Local};
use serde_json::Value;

/// Trait for probing the host environment for tools.
///
/// This trait abstracts command lookup so session-start probes can be tested
/// without depending on what is installed on the machine.
pub trait CommandRunner {
    /// Check if a program is available in PATH.
    fn is_available(&self, program: &str) -> bool;
}

/// What a pre-tool-use policy wants done with a tool call.
///
/// The binary only ever sees [`ToolDecision::Allow`] from [`AllowAll`].
/// `Block` and `Rewrite` are reachable only for embedders that install their
/// own policy through `HookContext::with_tool_policy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDecision {
    /// Let the call run as requested.
    Allow,
    /// Block the call, with a reason for the log.
    Block(String),
    /// Run the call with these parameters instead.
    Rewrite(Value),
}

/// Trait for deciding on tool calls before they run.
///
/// The binary carries no approval rules and always runs with [`AllowAll`].
/// This trait is an extension point for crates embedding the hooks library.
pub trait ToolPolicy {
    /// Decide on a call to `tool_name` with `parameters`.
    fn review(&self, tool_name: &str, parameters: &Value) -> ToolDecision;
}

/// Policy that allows every tool call unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl ToolPolicy for AllowAll {
    fn review(&self, _tool_name: &str, _parameters: &Value) -> ToolDecision {
        ToolDecision::Allow
    }
}

/// Source of the current local time.
///
/// The event log partitions files by local calendar date, so tests swap in a
/// fixed clock to simulate writes on different days.
pub trait Clock: Send + Sync {
    /// The current instant in local time.
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

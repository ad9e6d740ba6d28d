//! Hook implementations for Claude Code.
//!
//! Every hook reads one JSON object from stdin, records it in the event log
//! before doing anything else, and answers with a [`HookOutcome`]: an exit
//! code (non-zero asks the host to block the action) and optionally one JSON
//! object for stdout (a modified tool call or prompt).

mod notification;
mod post_tool_use;
mod pre_compact;
mod pre_tool_use;
mod session_start;
mod stop;
mod subagent_stop;
mod user_prompt_submit;

pub use notification::{run_notification, NotificationKind};
pub use post_tool_use::run_post_tool_use;
pub use pre_compact::{run_pre_compact, CompactStrategy};
pub use pre_tool_use::{run_pre_tool_use, ToolCall};
pub use session_start::run_session_start;
pub use stop::run_stop;
pub use subagent_stop::run_subagent_stop;
pub use user_prompt_submit::run_user_prompt_submit;

use crate::command::RealCommandRunner;
use crate::config::HooksConfig;
use crate::error::{Error, Result};
use crate::hook_logging::EventLogger;
use crate::paths;
use crate::traits::{AllowAll, Clock, CommandRunner, SystemClock, ToolPolicy};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit code asking the host to block the in-progress action.
pub const BLOCK_EXIT_CODE: i32 = 1;

/// A lifecycle event the host can run a hook for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// A session is starting, resuming, or being cleared.
    SessionStart,
    /// A tool call is about to run.
    PreToolUse,
    /// A tool call has completed.
    PostToolUse,
    /// The user submitted a prompt.
    UserPromptSubmit,
    /// The host raised a notification.
    Notification,
    /// The main agent finished responding.
    Stop,
    /// A subagent finished responding.
    SubagentStop,
    /// The context is about to be compacted.
    PreCompact,
}

impl HookEvent {
    /// Every hook event.
    pub const ALL: [Self; 8] = [
        Self::SessionStart,
        Self::PreToolUse,
        Self::PostToolUse,
        Self::UserPromptSubmit,
        Self::Notification,
        Self::Stop,
        Self::SubagentStop,
        Self::PreCompact,
    ];

    /// The source name this hook logs under.
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::PreToolUse => "pre_tool_use",
            Self::PostToolUse => "post_tool_use",
            Self::UserPromptSubmit => "user_prompt_submit",
            Self::Notification => "notification",
            Self::Stop => "stop",
            Self::SubagentStop => "subagent_stop",
            Self::PreCompact => "pre_compact",
        }
    }
}

/// What a hook asks of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    /// Process exit code; [`BLOCK_EXIT_CODE`] blocks the action.
    pub exit_code: i32,
    /// A JSON object to print on stdout, if the action should be modified.
    pub stdout: Option<String>,
}

impl HookOutcome {
    /// Let the action proceed unmodified.
    #[must_use]
    pub const fn proceed() -> Self {
        Self { exit_code: 0, stdout: None }
    }

    /// Block the action.
    #[must_use]
    pub const fn block() -> Self {
        Self { exit_code: BLOCK_EXIT_CODE, stdout: None }
    }

    /// Let the action proceed with a modification printed on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be serialized.
    pub fn respond<T: Serialize>(response: &T) -> Result<Self> {
        Ok(Self { exit_code: 0, stdout: Some(serde_json::to_string(response)?) })
    }

    /// Check if this outcome blocks the action.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        self.exit_code != 0
    }
}

/// Everything a hook needs besides its input.
pub struct HookContext {
    /// Project root the hook runs for.
    pub project_dir: PathBuf,
    /// Loaded project config.
    pub config: HooksConfig,
    /// Event log writer.
    pub logger: EventLogger,
    clock: Arc<dyn Clock>,
    runner: Box<dyn CommandRunner>,
    tool_policy: Box<dyn ToolPolicy>,
}

impl std::fmt::Debug for HookContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookContext")
            .field("project_dir", &self.project_dir)
            .field("config", &self.config)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl HookContext {
    /// Create a context with the real clock, command lookup, and a policy
    /// that allows every tool call.
    #[must_use]
    pub fn new(project_dir: &Path, config: HooksConfig) -> Self {
        Self::with_clock(project_dir, config, Arc::new(SystemClock))
    }

    /// Create a context with an explicit clock.
    #[must_use]
    pub fn with_clock(project_dir: &Path, config: HooksConfig, clock: Arc<dyn Clock>) -> Self {
        let logger =
            EventLogger::with_clock(paths::log_dir(project_dir, &config), Arc::clone(&clock));
        Self {
            project_dir: project_dir.to_path_buf(),
            config,
            logger,
            clock,
            runner: Box::new(RealCommandRunner::new()),
            tool_policy: Box::new(AllowAll),
        }
    }

    /// Write the event log into `log_dir` instead of the configured directory.
    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.logger = EventLogger::with_clock(log_dir, Arc::clone(&self.clock));
        self
    }

    /// Replace the command runner.
    #[must_use]
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the pre-tool-use policy.
    ///
    /// For embedders only. [`HookContext::new`] installs [`AllowAll`] and the
    /// CLI never replaces it.
    #[must_use]
    pub fn with_tool_policy(mut self, tool_policy: Box<dyn ToolPolicy>) -> Self {
        self.tool_policy = tool_policy;
        self
    }

    /// Append an entry to the event log using the configured file layout.
    pub fn log<T: Serialize + ?Sized>(&self, source: &str, payload: &T) {
        self.logger.log_event(source, payload, self.config.separate_files);
    }

    /// The current local time.
    #[must_use]
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Directory holding session backups.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        paths::backup_dir(self.logger.log_dir())
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub(crate) fn tool_policy(&self) -> &dyn ToolPolicy {
        self.tool_policy.as_ref()
    }
}

/// Parse hook input from stdin.
///
/// Empty input is treated as an empty object.
///
/// # Errors
///
/// Returns an error if the input is not a JSON object.
pub fn parse_hook_input(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let parsed: Value = serde_json::from_str(input)?;
    if !parsed.is_object() {
        return Err(Error::InvalidInput(format!("expected a JSON object, got {}", json_kind(&parsed))));
    }
    Ok(parsed)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Run a hook against raw stdin.
///
/// Failures in parsing or in the hook itself are logged as
/// `{"error": ..., "type": "<source>_error"}` and let the action proceed, so
/// a broken hook never blocks the host by accident.
pub fn run_hook(event: HookEvent, stdin: &str, ctx: &HookContext) -> HookOutcome {
    let result = parse_hook_input(stdin).and_then(|input| match event {
        HookEvent::SessionStart => run_session_start(&input, ctx),
        HookEvent::PreToolUse => run_pre_tool_use(&input, ctx),
        HookEvent::PostToolUse => run_post_tool_use(&input, ctx),
        HookEvent::UserPromptSubmit => run_user_prompt_submit(&input, ctx),
        HookEvent::Notification => run_notification(&input, ctx),
        HookEvent::Stop => run_stop(&input, ctx),
        HookEvent::SubagentStop => run_subagent_stop(&input, ctx),
        HookEvent::PreCompact => run_pre_compact(&input, ctx),
    });

    result.unwrap_or_else(|e| {
        let source = event.source();
        ctx.log(source, &json!({"error": e.to_string(), "type": format!("{source}_error")}));
        HookOutcome::proceed()
    })
}

/// Deserialize the typed view of a hook input.
pub(crate) fn typed_input<T: serde::de::DeserializeOwned>(input: &Value) -> Result<T> {
    Ok(serde_json::from_value(input.clone())?)
}

/// The object stored under `key`, or an empty map if absent or not an object.
pub(crate) fn object_field(value: &Value, key: &str) -> Map<String, Value> {
    match value.get(key) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// The value stored under `key`, or `default` if the key is absent.
///
/// An explicit `null` is kept as is.
pub(crate) fn field_or(map: &Map<String, Value>, key: &str, default: Value) -> Value {
    map.get(key).cloned().unwrap_or(default)
}

/// The first `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read_log, test_context};
    use tempfile::TempDir;

    #[test]
    fn test_parse_hook_input_empty() {
        let input = parse_hook_input("  \n").unwrap();
        assert_eq!(input, json!({}));
    }

    #[test]
    fn test_parse_hook_input_object() {
        let input = parse_hook_input(r#"{"tool": {"name": "Bash"}}"#).unwrap();
        assert_eq!(input["tool"]["name"], "Bash");
    }

    #[test]
    fn test_parse_hook_input_rejects_non_object() {
        let err = parse_hook_input("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_parse_hook_input_rejects_malformed() {
        assert!(matches!(parse_hook_input("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_source_names_are_distinct() {
        let mut names: Vec<&str> = HookEvent::ALL.iter().map(|e| e.source()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), HookEvent::ALL.len());
    }

    #[test]
    fn test_outcomes() {
        assert!(!HookOutcome::proceed().is_block());
        assert!(HookOutcome::block().is_block());
        let out = HookOutcome::respond(&json!({"prompt": "hi"})).unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.as_deref(), Some(r#"{"prompt":"hi"}"#));
    }

    #[test]
    fn test_malformed_input_is_logged_and_proceeds() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());

        for event in HookEvent::ALL {
            let outcome = run_hook(event, "{oops", &ctx);
            assert_eq!(outcome, HookOutcome::proceed());
        }

        let entries = read_log(&ctx);
        assert_eq!(entries.len(), HookEvent::ALL.len());
        for (entry, event) in entries.iter().zip(HookEvent::ALL) {
            assert_eq!(entry.hook, event.source());
            assert_eq!(entry.data["type"], format!("{}_error", event.source()));
            assert!(entry.data["error"].as_str().unwrap().starts_with("JSON error"));
        }
    }

    #[test]
    fn test_every_hook_logs_its_input_first() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());

        for event in HookEvent::ALL {
            let before = read_log(&ctx).len();
            run_hook(event, r#"{"marker": "first"}"#, &ctx);
            let entries = read_log(&ctx);
            assert_eq!(entries[before].hook, event.source());
            assert_eq!(entries[before].data["marker"], "first");
        }
    }

    #[test]
    fn test_separate_files_from_config() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_context(dir.path());
        ctx.config.separate_files = true;

        run_hook(HookEvent::Stop, "{}", &ctx);
        run_hook(HookEvent::Notification, "{}", &ctx);

        assert!(ctx.logger.log_path("stop", true).exists());
        assert!(ctx.logger.log_path("notification", true).exists());
        assert!(!ctx.logger.log_path("stop", false).exists());
    }

    #[test]
    fn test_default_context_allows_every_tool_call() {
        let dir = TempDir::new().unwrap();
        let ctx = HookContext::new(dir.path(), HooksConfig::default())
            .with_log_dir(dir.path().join("logs"));
        let input = json!({"tool_name": "Bash", "tool_input": {"command": "rm -rf /"}});

        let outcome = run_hook(HookEvent::PreToolUse, &input.to_string(), &ctx);

        assert_eq!(outcome, HookOutcome::proceed());
        assert!(outcome.stdout.is_none());
    }

    #[test]
    fn test_object_field_and_field_or() {
        let input = json!({"session": {"n": null}, "other": 3});
        let session = object_field(&input, "session");
        assert_eq!(field_or(&session, "n", json!(0)), Value::Null);
        assert_eq!(field_or(&session, "missing", json!(0)), json!(0));
        assert!(object_field(&input, "other").is_empty());
        assert!(object_field(&input, "absent").is_empty());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }
}

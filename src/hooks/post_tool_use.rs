//! `PostToolUse` hook.
//!
//! Runs after a tool completes. Besides the raw event, records:
//! - file modifications made by `Edit`, `Write`, and `MultiEdit`
//! - `Bash` commands that invoke one of the configured sensitive commands

use super::pre_tool_use::{ToolCall, ToolFields};
use super::{typed_input, HookContext, HookOutcome};
use crate::error::Result;
use regex::Regex;
use serde_json::{json, Value};

const SOURCE: &str = "post_tool_use";

/// Tools whose `file_path` parameter is modified by the call.
const FILE_MODIFYING_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit"];

/// Run the post tool use hook.
///
/// # Errors
///
/// Returns an error if the input has the wrong shape.
pub fn run_post_tool_use(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let call = typed_input::<ToolFields>(input)?.into_call();

    if let Some(file) = modified_file(&call) {
        ctx.log(
            SOURCE,
            &json!({"file_operation": {"tool": call.name, "file": file, "action": "modified"}}),
        );
    }

    if call.name == "Bash" {
        let command = call.parameters.get("command").and_then(Value::as_str).unwrap_or("");
        if let Some(matched) = sensitive_command(command, &ctx.config.sensitive_commands) {
            ctx.log(
                SOURCE,
                &json!({
                    "command_execution": {"command": command, "sensitive": true, "matched": matched}
                }),
            );
        }
    }

    Ok(HookOutcome::proceed())
}

/// The file a tool call modified, if it is a file-modifying tool.
fn modified_file(call: &ToolCall) -> Option<&str> {
    if !FILE_MODIFYING_TOOLS.contains(&call.name.as_str()) {
        return None;
    }
    call.parameters.get("file_path").and_then(Value::as_str).filter(|p| !p.is_empty())
}

/// Find the first sensitive command word used in a shell command.
///
/// Matches whole words only, so `rm` matches `rm -rf x` and `cd a && rm b`
/// but not `format` or `git-lfs`.
fn sensitive_command<'a>(command: &str, words: &'a [String]) -> Option<&'a str> {
    if command.is_empty() || words.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let pattern = format!(r"(?:^|[^\w-])({})(?:$|[^\w-])", alternatives.join("|"));
    let re = Regex::new(&pattern).ok()?;
    let found = re.captures(command)?.get(1)?.as_str();
    words.iter().map(String::as_str).find(|w| *w == found)
}

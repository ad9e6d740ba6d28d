//! `SubagentStop` hook.
//!
//! Runs when a subagent (a Task tool call) finishes. Records how it
//! performed, what artifacts it produced, and escalates failures.

use super::{field_or, object_field, truncate_chars, HookContext, HookOutcome};
use crate::error::Result;
use serde_json::{json, Value};

const SOURCE: &str = "subagent_stop";

/// Characters of the task description kept in the log.
const TASK_LOG_CHARS: usize = 100;

/// Run the subagent stop hook.
///
/// Fields are copied through as reported. Only an explicit `success: false`
/// counts as a failure.
///
/// # Errors
///
/// Never fails: missing subagent fields fall back to their defaults.
pub fn run_subagent_stop(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let subagent = object_field(input, "subagent");
    let kind = field_or(&subagent, "type", json!("unknown"));
    let task = match subagent.get("task") {
        Some(Value::String(task)) => json!(truncate_chars(task, TASK_LOG_CHARS)),
        Some(other) => other.clone(),
        None => json!(""),
    };
    let success = field_or(&subagent, "success", json!(true));

    ctx.log(
        SOURCE,
        &json!({
            "subagent_performance": {
                "type": kind,
                "task": task,
                "execution_time": subagent.get("execution_time"),
                "success": success,
            }
        }),
    );

    let artifacts =
        subagent.get("artifacts").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
    if !artifacts.is_empty() {
        let types: Vec<Value> =
            artifacts.iter().map(|a| a.get("type").cloned().unwrap_or(Value::Null)).collect();
        ctx.log(
            SOURCE,
            &json!({"subagent_artifacts": {"count": artifacts.len(), "types": types}}),
        );
    }

    if success == Value::Bool(false) {
        ctx.log(
            SOURCE,
            &json!({
                "subagent_error": {
                    "type": kind,
                    "error": field_or(&subagent, "error", json!({})),
                    "escalated": true,
                }
            }),
        );
    }

    Ok(HookOutcome::proceed())
}

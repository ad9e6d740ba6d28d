//! `Stop` hook.
//!
//! Runs when the main agent has finished responding. Records a summary of
//! the session for later analysis.

use super::{field_or, object_field, HookContext, HookOutcome};
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

const SOURCE: &str = "stop";

/// Summary written when a session stops.
///
/// Values are copied from the reported session as given, so a host sending
/// `null` or a float still gets its summary recorded.
#[derive(Debug, Serialize)]
struct SessionSummary {
    session_end: String,
    tools_used: Value,
    duration: Value,
    tasks_completed: Value,
    errors_encountered: Value,
}

/// Run the stop hook.
///
/// # Errors
///
/// Never fails: missing session fields fall back to their defaults.
pub fn run_stop(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let session = object_field(input, "session");
    let summary = SessionSummary {
        session_end: ctx.now().to_rfc3339(),
        tools_used: field_or(&session, "tools_used", json!([])),
        duration: field_or(&session, "duration", Value::Null),
        tasks_completed: field_or(&session, "tasks_completed", json!(0)),
        errors_encountered: field_or(&session, "errors", json!([])),
    };
    ctx.log(SOURCE, &json!({"session_summary": summary, "type": "session_metrics"}));

    Ok(HookOutcome::proceed())
}

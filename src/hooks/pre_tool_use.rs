//! `PreToolUse` hook.
//!
//! Runs after the agent has built a tool call and before the host executes
//! it. The call is recorded, then handed to the context's tool policy, which
//! may allow it, block it (non-zero exit), or rewrite its parameters (the
//! updated call is printed on stdout).

use super::{typed_input, HookContext, HookOutcome};
use crate::error::Result;
use crate::traits::ToolDecision;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SOURCE: &str = "pre_tool_use";

/// A tool call as seen by the hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The tool name, e.g. `Bash` or `Edit`.
    #[serde(default)]
    pub name: String,
    /// The tool parameters.
    #[serde(default)]
    pub parameters: Value,
}

/// Tool fields of a hook input.
///
/// Accepts both the nested `tool: {name, parameters}` shape and the flat
/// `tool_name`/`tool_input` shape.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolFields {
    #[serde(default)]
    tool: Option<ToolCall>,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    tool_input: Option<Value>,
}

impl ToolFields {
    /// Merge both input shapes into one call, preferring the nested one.
    pub(crate) fn into_call(self) -> ToolCall {
        let (mut name, mut parameters) = match self.tool {
            Some(call) => (call.name, call.parameters),
            None => (String::new(), Value::Null),
        };
        if name.is_empty() {
            name = self.tool_name.unwrap_or_default();
        }
        if parameters.is_null() {
            parameters = self.tool_input.unwrap_or_else(|| json!({}));
        }
        ToolCall { name, parameters }
    }
}

/// Output printed when the policy rewrites a call.
#[derive(Debug, Serialize)]
struct PreToolUseOutput<'a> {
    tool: &'a ToolCall,
}

/// Run the pre tool use hook.
///
/// # Errors
///
/// Returns an error if the input has the wrong shape.
pub fn run_pre_tool_use(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let call = typed_input::<ToolFields>(input)?.into_call();

    match ctx.tool_policy().review(&call.name, &call.parameters) {
        ToolDecision::Allow => Ok(HookOutcome::proceed()),
        ToolDecision::Block(reason) => {
            ctx.log(SOURCE, &json!({"tool_blocked": true, "tool": call.name, "reason": reason}));
            Ok(HookOutcome::block())
        }
        ToolDecision::Rewrite(parameters) if parameters != call.parameters => {
            let updated = ToolCall { name: call.name, parameters };
            HookOutcome::respond(&PreToolUseOutput { tool: &updated })
        }
        ToolDecision::Rewrite(_) => Ok(HookOutcome::proceed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read_log, test_context};
    use crate::traits::ToolPolicy;
    use tempfile::TempDir;

    struct FixedPolicy(ToolDecision);

    impl ToolPolicy for FixedPolicy {
        fn review(&self, _tool_name: &str, _parameters: &Value) -> ToolDecision {
            self.0.clone()
        }
    }

    struct AddTimeout;

    impl ToolPolicy for AddTimeout {
        fn review(&self, tool_name: &str, parameters: &Value) -> ToolDecision {
            if tool_name != "Bash" {
                return ToolDecision::Allow;
            }
            let mut updated = parameters.clone();
            updated["timeout"] = json!(60);
            ToolDecision::Rewrite(updated)
        }
    }

    #[test]
    fn test_default_policy_allows_silently() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        let input = json!({"tool": {"name": "Bash", "parameters": {"command": "ls"}}});

        let outcome = run_pre_tool_use(&input, &ctx).unwrap();

        assert_eq!(outcome, HookOutcome::proceed());
        let entries = read_log(&ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hook, "pre_tool_use");
        assert_eq!(entries[0].data, input);
    }

    #[test]
    fn test_block_decision_exits_nonzero() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path())
            .with_tool_policy(Box::new(FixedPolicy(ToolDecision::Block("no".to_string()))));

        let outcome =
            run_pre_tool_use(&json!({"tool_name": "Write", "tool_input": {}}), &ctx).unwrap();

        assert!(outcome.is_block());
        assert!(outcome.stdout.is_none());
        let entries = read_log(&ctx);
        assert_eq!(entries[1].data["tool_blocked"], true);
        assert_eq!(entries[1].data["tool"], "Write");
        assert_eq!(entries[1].data["reason"], "no");
    }

    #[test]
    fn test_rewrite_prints_updated_call() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path()).with_tool_policy(Box::new(AddTimeout));
        let input = json!({"tool": {"name": "Bash", "parameters": {"command": "make"}}});

        let outcome = run_pre_tool_use(&input, &ctx).unwrap();

        assert_eq!(outcome.exit_code, 0);
        let printed: Value = serde_json::from_str(outcome.stdout.as_deref().unwrap()).unwrap();
        assert_eq!(
            printed,
            json!({"tool": {"name": "Bash", "parameters": {"command": "make", "timeout": 60}}})
        );
    }

    #[test]
    fn test_rewrite_to_same_parameters_prints_nothing() {
        let dir = TempDir::new().unwrap();
        let params = json!({"file_path": "a.rs"});
        let ctx = test_context(dir.path())
            .with_tool_policy(Box::new(FixedPolicy(ToolDecision::Rewrite(params.clone()))));

        let outcome =
            run_pre_tool_use(&json!({"tool": {"name": "Read", "parameters": params}}), &ctx)
                .unwrap();

        assert_eq!(outcome, HookOutcome::proceed());
    }

    #[test]
    fn test_into_call_shapes() {
        let nested: ToolFields =
            serde_json::from_value(json!({"tool": {"name": "Edit", "parameters": {"x": 1}}}))
                .unwrap();
        assert_eq!(nested.into_call(), ToolCall { name: "Edit".into(), parameters: json!({"x": 1}) });

        let flat: ToolFields =
            serde_json::from_value(json!({"tool_name": "Bash", "tool_input": {"command": "ls"}}))
                .unwrap();
        assert_eq!(
            flat.into_call(),
            ToolCall { name: "Bash".into(), parameters: json!({"command": "ls"}) }
        );

        let empty: ToolFields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.into_call(), ToolCall { name: String::new(), parameters: json!({}) });
    }
}

//! `UserPromptSubmit` hook.
//!
//! Runs when the user submits a prompt, before the agent sees it. The prompt
//! is logged in truncated form, blocked if it looks like it carries
//! credentials, and otherwise may be extended with project context.

use super::{truncate_chars, typed_input, HookContext, HookOutcome};
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

const SOURCE: &str = "user_prompt_submit";

/// Characters of `README.md` included as context.
const README_EXCERPT_CHARS: usize = 500;

/// Characters of `CLAUDE.md` included as context.
const CLAUDE_MD_EXCERPT_CHARS: usize = 300;

const PROJECT_CONTEXT_NOTE: &str =
    "Project Context: Follow the existing patterns and conventions of this repository.";

/// Prompts asking for new code get the project context note.
static BUILD_REQUEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(implement|create|add)\b").unwrap());

/// Input provided to `UserPromptSubmit` hooks.
#[derive(Debug, Default, Deserialize)]
struct UserPromptSubmitInput {
    #[serde(default)]
    prompt: String,
}

/// Output printed when the prompt was changed.
#[derive(Debug, Serialize)]
struct UserPromptSubmitOutput<'a> {
    prompt: &'a str,
}

/// Run the user prompt submit hook.
///
/// # Errors
///
/// Returns an error if the input has the wrong shape.
pub fn run_user_prompt_submit(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, &redacted_input(input, ctx.config.prompt_log_limit));

    let prompt = typed_input::<UserPromptSubmitInput>(input)?.prompt;

    if let Some(pattern) = find_sensitive_pattern(&prompt, &ctx.config.sensitive_patterns) {
        ctx.log(
            SOURCE,
            &json!({"blocked_prompt": true, "reason": format!("Contains sensitive pattern: {pattern}")}),
        );
        return Ok(HookOutcome::block());
    }

    if !ctx.config.enhance_prompts {
        return Ok(HookOutcome::proceed());
    }

    let enhanced = enhance_prompt(&prompt, &ctx.project_dir);
    if enhanced == prompt {
        return Ok(HookOutcome::proceed());
    }
    HookOutcome::respond(&UserPromptSubmitOutput { prompt: &enhanced })
}

/// Copy of the input with a long prompt cut to `limit` characters plus `...`.
fn redacted_input(input: &Value, limit: usize) -> Value {
    let mut logged = input.clone();
    if let Some(prompt) = input.get("prompt").and_then(Value::as_str) {
        let kept = truncate_chars(prompt, limit);
        if kept.len() < prompt.len() {
            logged["prompt"] = json!(format!("{kept}..."));
        }
    }
    logged
}

/// The first configured pattern found in the prompt, ignoring case.
fn find_sensitive_pattern<'a>(prompt: &str, patterns: &'a [String]) -> Option<&'a str> {
    let lowered = prompt.to_lowercase();
    patterns
        .iter()
        .map(String::as_str)
        .find(|p| !p.is_empty() && lowered.contains(&p.to_lowercase()))
}

fn enhance_prompt(prompt: &str, project_dir: &Path) -> String {
    let mut enhanced = prompt.to_string();

    if BUILD_REQUEST.is_match(prompt) {
        enhanced.push_str("\n\n");
        enhanced.push_str(PROJECT_CONTEXT_NOTE);
    }

    let excerpts: Vec<String> = [
        ("README", "README.md", README_EXCERPT_CHARS),
        ("CLAUDE.md", "CLAUDE.md", CLAUDE_MD_EXCERPT_CHARS),
    ]
    .iter()
    .filter_map(|(label, file, limit)| {
        let content = std::fs::read_to_string(project_dir.join(file)).ok()?;
        Some(format!("{label} excerpt: {}", truncate_chars(&content, *limit)))
    })
    .collect();

    if !excerpts.is_empty() {
        enhanced.push_str("\n\n");
        enhanced.push_str(&excerpts.join("\n\n"));
    }

    enhanced
}

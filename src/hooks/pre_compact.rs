//! `PreCompact` hook.
//!
//! Runs before the host compacts the conversation context. Compaction is
//! refused while the session reports unsaved changes; otherwise the session
//! is backed up and a retention strategy is recorded.

use super::{field_or, object_field, HookContext, HookOutcome};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

const SOURCE: &str = "pre_compact";

/// Sessions with more tools than this keep their tool context.
const TOOL_CONTEXT_THRESHOLD: usize = 10;

/// Sessions with more files than this keep their file context.
const FILE_CONTEXT_THRESHOLD: usize = 5;

/// Backup file names embed the compaction time in this format.
const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How much context a compaction should keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactStrategy {
    /// Always keep the most recent messages.
    pub preserve_recent: bool,
    /// Always keep context marked important.
    pub keep_important_context: bool,
    /// Which messages to retain, e.g. `last_10_messages`.
    pub suggested_retention: &'static str,
    /// Keep tool call context (many tools were used).
    pub preserve_tool_context: bool,
    /// Keep file context (many files were touched).
    pub preserve_file_context: bool,
}

impl CompactStrategy {
    /// Pick a strategy for a compaction of the given type.
    ///
    /// Automatic compactions keep the fewest messages, manual ones the most.
    #[must_use]
    pub fn for_compaction(compact_type: &str, tools_used: usize, files_accessed: usize) -> Self {
        let suggested_retention = match compact_type {
            "auto" => "last_5_messages",
            "manual" => "last_15_messages",
            _ => "last_10_messages",
        };
        Self {
            preserve_recent: true,
            keep_important_context: true,
            suggested_retention,
            preserve_tool_context: tools_used > TOOL_CONTEXT_THRESHOLD,
            preserve_file_context: files_accessed > FILE_CONTEXT_THRESHOLD,
        }
    }
}

/// Run the pre-compact hook.
///
/// # Errors
///
/// Never fails: fields of the wrong type fall back to their defaults.
pub fn run_pre_compact(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let kind = input.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let session = object_field(input, "session");

    if session.get("unsaved_changes").and_then(Value::as_bool) == Some(true) {
        ctx.log(SOURCE, &json!({"compact_blocked": true, "reason": "Unsaved changes detected"}));
        return Ok(HookOutcome::block());
    }

    let stamp = ctx.now().format(BACKUP_STAMP_FORMAT).to_string();
    match write_backup(ctx, &session, &stamp) {
        Ok(path) => {
            let backup = json!({"file": path.display().to_string(), "timestamp": stamp});
            ctx.log(SOURCE, &json!({ "session_backup": backup }));
        }
        Err(e) => ctx.log(SOURCE, &json!({"backup_error": e.to_string()})),
    }

    let tools_used = list_field(&session, "tools_used");
    let files_accessed = list_field(&session, "files_accessed");
    let strategy = CompactStrategy::for_compaction(kind, tools_used.len(), files_accessed.len());
    ctx.log(
        SOURCE,
        &json!({
            "compact_preparation": {
                "compact_timestamp": ctx.now().to_rfc3339(),
                "compact_type": kind,
                "session_id": session.get("session_id"),
                "pre_compact_stats": {
                    "total_messages": field_or(&session, "message_count", json!(0)),
                    "context_size": field_or(&session, "context_size", json!(0)),
                    "tools_used": tools_used,
                    "files_accessed": files_accessed,
                    "compact_trigger": field_or(&session, "compact_trigger", json!("unknown")),
                },
                "strategy": strategy,
            }
        }),
    );

    Ok(HookOutcome::proceed())
}

/// Write the session as pretty JSON to a timestamped file in the backup dir.
fn write_backup(ctx: &HookContext, session: &Map<String, Value>, stamp: &str) -> Result<PathBuf> {
    let dir = ctx.backup_dir();
    let path = dir.join(format!("session_backup_{stamp}.json"));
    let content = serde_json::to_string_pretty(session)?;
    std::fs::create_dir_all(&dir)
        .and_then(|()| std::fs::write(&path, content))
        .map_err(|source| Error::Backup { path: path.clone(), source })?;
    Ok(path)
}

fn list_field(session: &Map<String, Value>, key: &str) -> Vec<Value> {
    session.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read_log, test_context};
    use tempfile::TempDir;

    #[test]
    fn test_unsaved_changes_block() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        let input = json!({"type": "auto", "session": {"unsaved_changes": true}});

        let outcome = run_pre_compact(&input, &ctx).unwrap();

        assert!(outcome.is_block());
        let entries = read_log(&ctx);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].data,
            json!({"compact_blocked": true, "reason": "Unsaved changes detected"})
        );
        assert!(!ctx.backup_dir().exists());
    }

    #[test]
    fn test_backup_written() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        let input = json!({"type": "manual", "session": {"session_id": "abc", "message_count": 40}});

        let outcome = run_pre_compact(&input, &ctx).unwrap();

        assert_eq!(outcome, HookOutcome::proceed());
        let backup = ctx.backup_dir().join("session_backup_20240115_103000.json");
        let content = std::fs::read_to_string(&backup).unwrap();
        assert!(content.contains('\n'));
        let saved: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(saved, json!({"session_id": "abc", "message_count": 40}));

        let entries = read_log(&ctx);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].data["session_backup"]["file"], backup.display().to_string());
        assert_eq!(entries[1].data["session_backup"]["timestamp"], "20240115_103000");
    }

    #[test]
    fn test_compact_preparation_logged() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        let tools: Vec<String> = (0..11).map(|i| format!("tool{i}")).collect();
        let input = json!({
            "type": "auto",
            "session": {"session_id": "s9", "tools_used": tools, "files_accessed": ["a", "b"]}
        });

        run_pre_compact(&input, &ctx).unwrap();

        let entries = read_log(&ctx);
        let prep = &entries[2].data["compact_preparation"];
        assert_eq!(prep["compact_type"], "auto");
        assert_eq!(prep["session_id"], "s9");
        assert_eq!(prep["pre_compact_stats"]["total_messages"], 0);
        assert_eq!(prep["pre_compact_stats"]["compact_trigger"], "unknown");
        assert_eq!(prep["pre_compact_stats"]["tools_used"].as_array().unwrap().len(), 11);
        assert_eq!(prep["strategy"]["suggested_retention"], "last_5_messages");
        assert_eq!(prep["strategy"]["preserve_tool_context"], true);
        assert_eq!(prep["strategy"]["preserve_file_context"], false);
    }

    #[test]
    fn test_backup_failure_logged_and_proceeds() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());
        // A file where the backup directory should be.
        std::fs::create_dir_all(ctx.logger.log_dir()).unwrap();
        std::fs::write(ctx.backup_dir(), "").unwrap();

        let outcome = run_pre_compact(&json!({}), &ctx).unwrap();

        assert_eq!(outcome, HookOutcome::proceed());
        let entries = read_log(&ctx);
        assert_eq!(entries.len(), 3);
        let msg = entries[1].data["backup_error"].as_str().unwrap();
        assert!(msg.contains("session_backup_20240115_103000.json"));
        assert_eq!(entries[2].data["compact_preparation"]["compact_type"], "unknown");
    }

    #[test]
    fn test_null_type_and_session_use_defaults() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());

        let outcome = run_pre_compact(&json!({"type": null, "session": null}), &ctx).unwrap();

        assert_eq!(outcome, HookOutcome::proceed());
        let entries = read_log(&ctx);
        let prep = &entries[2].data["compact_preparation"];
        assert_eq!(prep["compact_type"], "unknown");
        assert_eq!(prep["strategy"]["suggested_retention"], "last_10_messages");
    }

    #[test]
    fn test_strategy_retention() {
        assert_eq!(CompactStrategy::for_compaction("auto", 0, 0).suggested_retention, "last_5_messages");
        assert_eq!(
            CompactStrategy::for_compaction("manual", 0, 0).suggested_retention,
            "last_15_messages"
        );
        assert_eq!(
            CompactStrategy::for_compaction("other", 0, 0).suggested_retention,
            "last_10_messages"
        );
        let s = CompactStrategy::for_compaction("auto", 10, 6);
        assert!(!s.preserve_tool_context);
        assert!(s.preserve_file_context);
    }
}

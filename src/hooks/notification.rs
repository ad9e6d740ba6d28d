//! `Notification` hook.
//!
//! Runs when the host needs permission to use a tool or the prompt has been
//! idle. Notifications are only recorded; nothing is sent anywhere.

use super::{typed_input, HookContext, HookOutcome};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SOURCE: &str = "notification";

/// Kind of notification the host raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The agent is waiting for permission to use a tool.
    PermissionRequest,
    /// The prompt has been idle.
    IdleTimeout,
    /// Anything else.
    Other,
}

impl NotificationKind {
    /// Classify a notification `type` field.
    #[must_use]
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "permission_request" => Self::PermissionRequest,
            "idle_timeout" => Self::IdleTimeout,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NotificationInput {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

/// Run the notification hook.
///
/// # Errors
///
/// Returns an error if the input has the wrong shape.
pub fn run_notification(input: &Value, ctx: &HookContext) -> Result<HookOutcome> {
    ctx.log(SOURCE, input);

    let parsed: NotificationInput = typed_input(input)?;
    let kind = NotificationKind::from_type(&parsed.kind);
    ctx.log(
        SOURCE,
        &json!({"notification": {"kind": kind, "type": parsed.kind, "message": parsed.message}}),
    );

    Ok(HookOutcome::proceed())
}

//! Hook input types for Claude Code integration.
//!
//! Both hooks receive one JSON object on stdin. Fields are read leniently:
//! the host may omit any of them, and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::prompt::is_truthy;

/// Session id used when the payload carries none.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Payload shared by the prompt-submit and stop hooks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HookPayload {
    /// Opaque session identifier.
    #[serde(default)]
    pub session_id: Option<Value>,
    /// Set by the host when it re-runs the stop hook after a block.
    #[serde(default)]
    pub stop_hook_active: Option<Value>,
    /// The submitted prompt (prompt-submit only), in any supported shape.
    #[serde(default)]
    pub prompt: Option<Value>,
}

impl HookPayload {
    /// Session id, or `"unknown"` when missing, null or empty.
    pub fn session_id(&self) -> String {
        match &self.session_id {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => UNKNOWN_SESSION.to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Whether the host flagged this stop as a re-entry.
    pub fn stop_hook_active(&self) -> bool {
        self.stop_hook_active.as_ref().is_some_and(is_truthy)
    }

    /// Raw prompt value, null when absent.
    pub fn prompt(&self) -> &Value {
        self.prompt.as_ref().unwrap_or(&Value::Null)
    }
}

/// Parse hook input from JSON.
pub fn parse_input<T: for<'de> Deserialize<'de>>(json: &str) -> crate::error::Result<T> {
    serde_json::from_str(json)
        .map_err(|e| crate::error::ChimeError::serde(format!("Failed to parse hook input: {}", e)))
}

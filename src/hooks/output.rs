//! Hook output types for Claude Code integration.
//!
//! Only the stop hook ever writes to stdout, and only to block.

use serde::{Deserialize, Serialize};

use crate::error::exit_codes;

/// Instruction prefix the host's summary subagent is keyed on.
pub const SUMMARY_TASK: &str = "TASK:use summary subagent";

/// Decision for the stop hook.
///
/// Letting the stop proceed is signalled by exit 0 with no output, so
/// blocking is the only decision ever written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopDecision {
    /// Block the stop and hand the host an instruction.
    Block,
}

impl StopDecision {
    /// Get the exit code for this decision.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Block => exit_codes::BLOCK,
        }
    }
}

/// Output for the stop hook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopOutput {
    /// The decision.
    pub decision: StopDecision,
    /// Instruction for the host when blocking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StopOutput {
    /// Block and ask the host to run the summary workflow for `run_id`.
    pub fn block_for_run(run_id: &str) -> Self {
        Self {
            decision: StopDecision::Block,
            reason: Some(format!("{} RUN_ID={}", SUMMARY_TASK, run_id)),
        }
    }

    /// Run id carried in the reason, if any.
    pub fn run_id(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .and_then(|reason| reason.split_once("RUN_ID="))
            .map(|(_, run_id)| run_id)
    }
}

/// Serialize output to JSON.
pub fn to_json<T: Serialize>(output: &T) -> crate::error::Result<String> {
    serde_json::to_string(output)
        .map_err(|e| crate::error::ChimeError::serde(format!("Failed to serialize output: {}", e)))
}

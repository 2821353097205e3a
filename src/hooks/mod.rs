//! Hook integration for Claude Code.
//!
//! This module provides types and handlers for the two hooks chime serves:
//!
//! - **user-prompt-submit**: append the submitted prompt to the hook log
//! - **stop**: log the stop and ask for a summary at most once per session

pub mod input;
pub mod output;
pub mod runner;

pub use input::{parse_input, HookPayload, UNKNOWN_SESSION};
pub use output::{to_json, StopDecision, StopOutput, SUMMARY_TASK};
pub use runner::{HookResponse, HookRunner, HookType};

//! chime - prompt logging and one-shot summary requests for Claude Code
//!
//! Two hooks share this crate. The prompt-submit hook appends every user
//! prompt to a project-local log. The stop hook logs the stop and, at most
//! once per session per TTL window, blocks the stop with an instruction to
//! run the summary subagent. A per-session lock file in the temp dir is the
//! dedup token between stops.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod hooks;
pub mod journal;
pub mod runtime;
pub mod storage;

pub use config::Config;
pub use core::{
    is_truthy, normalize, LockRecord, LockStage, LockState, StopCoordinator, StopOutcome,
    LOCK_VERSION,
};
pub use error::{ChimeError, FailOpen, Result};
pub use hooks::{HookPayload, HookResponse, HookRunner, HookType, StopDecision, StopOutput};
pub use journal::HookLog;
pub use storage::{FileLockStore, LockStore, MemoryLockStore};

// CLI commands
pub use cli::LockCommand;

//! Core domain logic for chime.
//!
//! - [`prompt`]: prompt payload normalization
//! - [`lock`]: the per-session summary lock record and its derived state
//! - [`coordinator`]: the stop-hook dedup state machine

pub mod coordinator;
pub mod lock;
pub mod prompt;

pub use coordinator::{StopCoordinator, StopOutcome};
pub use lock::{LockRecord, LockStage, LockState, LOCK_VERSION};
pub use prompt::{is_truthy, normalize};

//! CLI commands for chime.
//!
//! The hooks themselves are driven from [`crate::hooks`]; this module holds
//! the operator-facing commands.

pub mod lock_cmd;

pub use lock_cmd::{LockAction, LockCommand, LockOptions, LockOutput};

//! Lock storage for chime.
//!
//! This module provides persistence for per-session summary locks,
//! with a file-based backend and an in-memory backend for tests.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileLockStore;
pub use memory::MemoryLockStore;
pub use traits::LockStore;

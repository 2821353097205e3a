//! Unified error types for chime with fail-open philosophy.
//!
//! A hook must never be the reason the host's turn fails or hangs. Every
//! fallible operation returns a typed [`Result`]; hook code paths discard
//! failures through [`FailOpen`], which logs a warning and substitutes a
//! safe value.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for chime operations.
#[derive(Error, Debug)]
pub enum ChimeError {
    /// I/O errors from log or lock file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// No lock file exists for the session.
    #[error("no lock for session: {session_id}")]
    LockNotFound { session_id: String },

    /// A lock stage name that is not `requested`, `done` or `failed`.
    #[error("invalid lock stage: {value}")]
    InvalidStage { value: String },

    /// The lock belongs to a different notification attempt.
    #[error("run id mismatch: lock has {found}, expected {expected}")]
    RunIdMismatch { expected: String, found: String },
}

/// A specialized Result type for chime operations.
pub type Result<T> = std::result::Result<T, ChimeError>;

impl ChimeError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a lock-not-found error.
    pub fn lock_not_found(session_id: impl Into<String>) -> Self {
        Self::LockNotFound {
            session_id: session_id.into(),
        }
    }

    /// Create an invalid stage error.
    pub fn invalid_stage(value: impl Into<String>) -> Self {
        Self::InvalidStage {
            value: value.into(),
        }
    }

    /// Create a run id mismatch error.
    pub fn run_id_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::RunIdMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<io::Error> for ChimeError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ChimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and continue with a safe value instead of propagating.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes understood by the host.
pub mod exit_codes {
    /// Normal completion, nothing requested from the host.
    pub const SUCCESS: i32 = 0;

    /// Operator command failed (never used by the hooks themselves).
    pub const FAILURE: i32 = 1;

    /// Block normal completion and run the task in the stdout `reason`.
    pub const BLOCK: i32 = 2;
}

//! Append-only hook log.
//!
//! Both hooks append to `<project_dir>/logs/claude-hooks.log`. The log is
//! human-readable and shared across sessions; chime never reads it back or
//! rotates it. Appends are not locked, so entries from concurrent sessions
//! may interleave.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::config::Config;
use crate::error::{ChimeError, Result};

/// Marker separating the prompt header from the prompt text.
const PROMPT_MARKER: &str = "----- USER PROMPT -----";

/// Writer for the shared hook log.
#[derive(Debug, Clone)]
pub struct HookLog {
    path: PathBuf,
}

impl HookLog {
    /// Create a log writer for a specific file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log writer for the configured project.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.log_file_path())
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log directory if missing. Idempotent.
    pub fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ChimeError::storage(parent, e))?;
        }
        Ok(())
    }

    /// Append a prompt entry: header line, then the prompt text.
    pub fn append_prompt<Tz: TimeZone>(
        &self,
        session_id: &str,
        text: &str,
        at: &DateTime<Tz>,
    ) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.append(&format!(
            "{} Start session={} {} \n{}\n",
            format_timestamp(at),
            session_id,
            PROMPT_MARKER,
            text
        ))
    }

    /// Append a stop entry.
    pub fn append_stop<Tz: TimeZone>(&self, session_id: &str, at: &DateTime<Tz>) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.append(&format!("{} Stop session={}\n", format_timestamp(at), session_id))
    }

    /// Append raw text in a single write.
    fn append(&self, entry: &str) -> Result<()> {
        self.ensure_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ChimeError::storage(&self.path, e))?;

        file.write_all(entry.as_bytes())
            .map_err(|e| ChimeError::storage(&self.path, e))
    }
}

/// Second-precision ISO-like timestamp without offset.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

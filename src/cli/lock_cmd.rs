//! Lock command for chime.
//!
//! Operator escape hatch over the per-session summary locks: inspect a
//! lock, record the downstream workflow's final stage, or clear it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::lock::{epoch_seconds, LockRecord, LockStage, LockState};
use crate::error::{ChimeError, Result};
use crate::storage::LockStore;

/// Options for the lock command.
#[derive(Debug, Clone, Default)]
pub struct LockOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// What to do with the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAction {
    /// Print the record and its derived state.
    Show,
    /// Rewrite the stage, optionally only for a given run.
    Mark {
        stage: String,
        run_id: Option<String>,
    },
    /// Delete the lock.
    Clear,
}

/// Output format for the lock command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Session the command acted on.
    pub session_id: String,
    /// The lock record after the command, if one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<LockRecord>,
    /// Derived lock state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LockState>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LockOutput {
    /// Create a successful output.
    pub fn success(
        session_id: impl Into<String>,
        record: Option<LockRecord>,
        state: LockState,
    ) -> Self {
        Self {
            success: true,
            session_id: session_id.into(),
            record,
            state: Some(state),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(session_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            session_id: session_id.into(),
            record: None,
            state: None,
            error: Some(error.into()),
        }
    }
}

/// The lock command implementation.
pub struct LockCommand<S: LockStore> {
    store: S,
    config: Config,
}

impl<S: LockStore> LockCommand<S> {
    /// Create a new lock command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Run the lock command.
    pub fn run(&self, session_id: &str, action: &LockAction) -> LockOutput {
        self.run_at(session_id, action, Utc::now())
    }

    /// Run the lock command, deriving states at `now`.
    pub fn run_at(&self, session_id: &str, action: &LockAction, now: DateTime<Utc>) -> LockOutput {
        let result = match action {
            LockAction::Show => self.show(session_id, now),
            LockAction::Mark { stage, run_id } => {
                self.mark(session_id, stage, run_id.as_deref(), now)
            }
            LockAction::Clear => self.clear(session_id),
        };

        result.unwrap_or_else(|e| LockOutput::failure(session_id, e.to_string()))
    }

    fn show(&self, session_id: &str, now: DateTime<Utc>) -> Result<LockOutput> {
        let record = self.load(session_id)?;
        let state = self.state_of(&record, now);
        Ok(LockOutput::success(session_id, Some(record), state))
    }

    fn mark(
        &self,
        session_id: &str,
        stage: &str,
        run_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LockOutput> {
        let stage: LockStage = stage.parse()?;
        let record = self.load(session_id)?;

        if let Some(expected) = run_id {
            if expected != record.run_id {
                return Err(ChimeError::run_id_mismatch(expected, &record.run_id));
            }
        }

        let updated = record.with_stage(stage);
        self.store.put(session_id, &updated)?;

        let state = self.state_of(&updated, now);
        Ok(LockOutput::success(session_id, Some(updated), state))
    }

    fn clear(&self, session_id: &str) -> Result<LockOutput> {
        self.store.delete(session_id)?;
        Ok(LockOutput::success(session_id, None, LockState::Absent))
    }

    fn load(&self, session_id: &str) -> Result<LockRecord> {
        self.store
            .get(session_id)?
            .ok_or_else(|| ChimeError::lock_not_found(session_id))
    }

    fn state_of(&self, record: &LockRecord, now: DateTime<Utc>) -> LockState {
        record.state_at(epoch_seconds(now), self.config.summary_ttl_sec)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LockOutput, options: &LockOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &LockOutput) -> String {
        if !output.success {
            return format!(
                "Lock command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let state = output
            .state
            .map(|s| format!("{:?}", s))
            .unwrap_or_else(|| "unknown".to_string());

        match &output.record {
            Some(record) => format!(
                "Session: {}\nStage:   {}\nRun ID:  {}\nCreated: {}\nState:   {}\n",
                output.session_id, record.stage, record.run_id, record.ts, state
            ),
            None => format!("Session: {}\nState:   {}\n", output.session_id, state),
        }
    }
}

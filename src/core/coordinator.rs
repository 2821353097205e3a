//! Stop-hook state machine.
//!
//! Decides, on every stop event, whether the host should be asked to run
//! the summary workflow. The per-session lock is the dedup token:
//!
//! | Lock state       | Action                     | Outcome       |
//! |------------------|----------------------------|---------------|
//! | Absent           | write a `requested` lock   | `Requested`   |
//! | Active-Requested | none                       | `InFlight`    |
//! | Active-Terminal  | delete the lock            | `Released`    |
//! | Expired          | delete the lock            | `Released`    |
//!
//! The feature toggle and the host's re-entry flag short-circuit before
//! the lock is touched.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::core::lock::{epoch_seconds, LockRecord, LockState};
use crate::error::FailOpen;
use crate::storage::LockStore;

/// Result of one stop-hook evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Summaries are switched off.
    Disabled,
    /// The host is replaying the hook after a previous block.
    ReEntry,
    /// A new lock was written; the host must be asked to run the summary.
    Requested { run_id: String },
    /// A request for this session is still within its TTL.
    InFlight,
    /// A terminal or expired lock was discarded.
    Released { state: LockState },
    /// A lock existed but could not be read or parsed; it was discarded.
    DiscardedUnreadable,
    /// Writing the new lock failed; nothing is requested.
    WriteFailed,
}

impl StopOutcome {
    /// Run id to hand to the host, only for `Requested`.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            StopOutcome::Requested { run_id } => Some(run_id),
            _ => None,
        }
    }

    /// Whether the host should be blocked.
    pub fn is_request(&self) -> bool {
        matches!(self, StopOutcome::Requested { .. })
    }
}

/// Stop-hook coordinator over a lock store.
pub struct StopCoordinator<'a, S: LockStore> {
    store: &'a S,
    config: &'a Config,
}

impl<'a, S: LockStore> StopCoordinator<'a, S> {
    /// Create a coordinator.
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Evaluate a stop event for `session_id` at `now`.
    pub fn evaluate(
        &self,
        session_id: &str,
        stop_hook_active: bool,
        now: DateTime<Utc>,
    ) -> StopOutcome {
        if !self.config.enable_tts {
            return StopOutcome::Disabled;
        }

        if stop_hook_active {
            return StopOutcome::ReEntry;
        }

        match self.store.get(session_id) {
            Ok(None) => self.request(session_id, now),
            Ok(Some(record)) => self.settle(session_id, &record, now),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "discarding unreadable lock");
                self.store
                    .delete(session_id)
                    .fail_open_default("deleting unreadable lock");
                StopOutcome::DiscardedUnreadable
            }
        }
    }

    fn request(&self, session_id: &str, now: DateTime<Utc>) -> StopOutcome {
        let record = LockRecord::requested(now, self.config.summary_ttl_sec);

        match self.store.put(session_id, &record) {
            Ok(()) => {
                tracing::debug!(session_id, run_id = %record.run_id, "summary requested");
                StopOutcome::Requested {
                    run_id: record.run_id,
                }
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "failed to write lock, not requesting");
                StopOutcome::WriteFailed
            }
        }
    }

    fn settle(&self, session_id: &str, record: &LockRecord, now: DateTime<Utc>) -> StopOutcome {
        let state = record.state_at(epoch_seconds(now), self.config.summary_ttl_sec);

        match state {
            LockState::ActiveRequested => StopOutcome::InFlight,
            LockState::ActiveTerminal | LockState::Expired => {
                self.store
                    .delete(session_id)
                    .fail_open_default("deleting settled lock");
                StopOutcome::Released { state }
            }
            LockState::Absent => self.request(session_id, now),
        }
    }
}

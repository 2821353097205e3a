//! Hook runner for chime.
//!
//! This module implements the hook dispatch and the two hook handlers.
//! Neither handler can fail the host: every error is absorbed and turned
//! into exit status 0 with no output.

use std::io::{self, Read};

use chrono::{Local, Utc};

use crate::config::Config;
use crate::core::coordinator::{StopCoordinator, StopOutcome};
use crate::core::prompt::normalize;
use crate::error::{exit_codes, ChimeError, FailOpen, Result};
use crate::hooks::input::{parse_input, HookPayload};
use crate::hooks::output::{to_json, StopOutput};
use crate::journal::HookLog;
use crate::storage::LockStore;

/// Hook type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookType {
    /// Prompt-submit hook.
    UserPromptSubmit,
    /// Stop hook.
    Stop,
}

/// What the process should emit once a hook has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResponse {
    /// Process exit status.
    pub exit_code: i32,
    /// Text for stdout, if any.
    pub stdout: Option<String>,
}

impl HookResponse {
    /// Exit 0 with no output.
    pub fn silent() -> Self {
        Self {
            exit_code: exit_codes::SUCCESS,
            stdout: None,
        }
    }

    /// Exit 2 with the block instruction on stdout.
    pub fn block(output: &StopOutput) -> Result<Self> {
        Ok(Self {
            exit_code: output.decision.exit_code(),
            stdout: Some(to_json(output)?),
        })
    }
}

/// Hook runner context.
pub struct HookRunner<S: LockStore> {
    /// Lock storage.
    store: S,
    /// Configuration.
    config: Config,
    /// Shared hook log.
    log: HookLog,
}

impl<S: LockStore> HookRunner<S> {
    /// Create a new hook runner.
    pub fn new(store: S, config: Config) -> Self {
        let log = HookLog::from_config(&config);
        Self { store, config, log }
    }

    /// Lock storage backing this runner.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a hook with input from stdin. Unreadable stdin counts as empty.
    pub fn run(&self, hook_type: HookType) -> HookResponse {
        let input = read_stdin().fail_open_default("reading hook input");
        self.run_with_input(hook_type, &input)
    }

    /// Run a hook with provided input.
    pub fn run_with_input(&self, hook_type: HookType, input: &str) -> HookResponse {
        match hook_type {
            HookType::UserPromptSubmit => self.handle_prompt_submit(input),
            HookType::Stop => self.handle_stop(input),
        }
    }

    // =========================================================================
    // Prompt Submit Handler
    // =========================================================================

    /// Handle the prompt-submit hook.
    ///
    /// Malformed input ends the hook without a log entry.
    fn handle_prompt_submit(&self, input: &str) -> HookResponse {
        let payload: HookPayload = match parse_input(input) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed prompt payload");
                return HookResponse::silent();
            }
        };

        let session_id = payload.session_id();
        let text = normalize(payload.prompt());

        self.log
            .append_prompt(&session_id, &text, &Local::now())
            .fail_open_default("appending prompt entry");

        HookResponse::silent()
    }

    // =========================================================================
    // Stop Handler
    // =========================================================================

    /// Handle the stop hook.
    ///
    /// 1. Log the stop event
    /// 2. Run the lock state machine
    /// 3. Block only when a new summary was requested
    fn handle_stop(&self, input: &str) -> HookResponse {
        let payload: HookPayload = parse_input(input).unwrap_or_else(|e: ChimeError| {
            tracing::debug!(error = %e, "treating malformed stop payload as empty");
            HookPayload::default()
        });

        let session_id = payload.session_id();

        self.log
            .append_stop(&session_id, &Local::now())
            .fail_open_default("appending stop entry");

        let coordinator = StopCoordinator::new(&self.store, &self.config);
        let outcome = coordinator.evaluate(&session_id, payload.stop_hook_active(), Utc::now());
        tracing::debug!(session_id = %session_id, outcome = ?outcome, "stop evaluated");

        match outcome {
            StopOutcome::Requested { run_id } => {
                HookResponse::block(&StopOutput::block_for_run(&run_id))
                    .fail_open_with("serializing block output", HookResponse::silent())
            }
            _ => HookResponse::silent(),
        }
    }
}

/// Read input from stdin.
fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ChimeError::storage("stdin", e))?;
    Ok(input)
}

//! chime - prompt logging and one-shot summary requests for Claude Code
//!
//! CLI entry point with global panic handler.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use chime::cli::{LockAction, LockCommand, LockOptions};
use chime::config::Config;
use chime::error::exit_codes;
use chime::hooks::HookType;
use chime::runtime;
use chime::storage::FileLockStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// chime - prompt logging and one-shot summary requests for Claude Code
#[derive(Parser)]
#[command(name = "chime")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// [Internal] Run a hook (JSON stdin). Called by Claude Code hooks
    Hook {
        /// The hook event type
        #[arg(value_enum)]
        event: HookEvent,
    },

    /// [Developer] Inspect or update a session's summary lock
    Lock {
        #[command(subcommand)]
        action: LockCliAction,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum HookEvent {
    UserPromptSubmit,
    Stop,
}

impl From<HookEvent> for HookType {
    fn from(event: HookEvent) -> Self {
        match event {
            HookEvent::UserPromptSubmit => HookType::UserPromptSubmit,
            HookEvent::Stop => HookType::Stop,
        }
    }
}

#[derive(Subcommand)]
enum LockCliAction {
    /// Show the lock and its derived state
    Show {
        /// Session ID
        session_id: String,
    },
    /// Set the lock stage (requested, done, failed)
    Mark {
        /// Session ID
        session_id: String,
        /// New stage
        stage: String,
        /// Only update if the lock belongs to this run
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Delete the lock
    Clear {
        /// Session ID
        session_id: String,
    },
}

impl LockCliAction {
    fn into_parts(self) -> (String, LockAction) {
        match self {
            LockCliAction::Show { session_id } => (session_id, LockAction::Show),
            LockCliAction::Mark {
                session_id,
                stage,
                run_id,
            } => (session_id, LockAction::Mark { stage, run_id }),
            LockCliAction::Clear { session_id } => (session_id, LockAction::Clear),
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    runtime::install_panic_hook();
    runtime::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hook { event } => runtime::run_hook(event.into()),
        Commands::Lock {
            action,
            json,
            quiet,
        } => run_lock(action, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::FAILURE as u8)
    }
}

fn run_lock(action: LockCliAction, json: bool, quiet: bool) -> ExitCode {
    let config = Config::load();
    let store = FileLockStore::new(config.lock_dir.clone());

    let cmd = LockCommand::new(store, config);
    let options = LockOptions { json, quiet };
    let (session_id, action) = action.into_parts();

    let output = cmd.run(&session_id, &action);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        print!("{}", formatted);
        if options.json {
            println!();
        }
    }

    success_to_exit_code(output.success)
}

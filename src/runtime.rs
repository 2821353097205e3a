//! Process plumbing shared by the chime binaries.
//!
//! Stdout belongs to the hook protocol, so diagnostics go to stderr and are
//! off unless `CHIME_LOG` enables them.

use std::io::Write;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::exit_codes;
use crate::hooks::{HookRunner, HookType};
use crate::storage::FileLockStore;

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "CHIME_LOG";

/// Install the stderr tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("off"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Set up the global panic handler.
///
/// A panic is reported on stderr and the process exits 0 so the host is
/// never blocked by a crash.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("chime panic: {}", info);
        std::process::exit(exit_codes::SUCCESS);
    }));
}

/// Run one hook against the real environment and return its exit code.
pub fn run_hook(hook_type: HookType) -> ExitCode {
    let config = Config::load();
    tracing::debug!(
        project_dir = %config.project_dir.display(),
        lock_dir = %config.lock_dir.display(),
        ttl = config.summary_ttl_sec,
        enabled = config.enable_tts,
        "hook config loaded"
    );

    let store = FileLockStore::new(config.lock_dir.clone());
    let runner = HookRunner::new(store, config);

    let response = runner.run(hook_type);

    if let Some(stdout) = &response.stdout {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", stdout);
        let _ = out.flush();
    }

    exit_code(response.exit_code)
}

/// Convert a numeric exit status to an `ExitCode`.
pub fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

/// Entry point body for the standalone hook binaries.
pub fn hook_main(hook_type: HookType) -> ExitCode {
    install_panic_hook();
    init_tracing();
    run_hook(hook_type)
}

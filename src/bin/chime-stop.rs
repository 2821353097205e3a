//! Stop hook entry point. Reads the hook payload on stdin; exits 2 with a
//! block instruction on stdout when a summary is requested.

use std::process::ExitCode;

use chime::hooks::HookType;

fn main() -> ExitCode {
    chime::runtime::hook_main(HookType::Stop)
}

//! Prompt-submit hook entry point. Reads the hook payload on stdin.

use std::process::ExitCode;

use chime::hooks::HookType;

fn main() -> ExitCode {
    chime::runtime::hook_main(HookType::UserPromptSubmit)
}

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tempfile::TempDir;

pub const PROMPT_BIN: &str = env!("CARGO_BIN_EXE_chime-prompt-submit");
pub const STOP_BIN: &str = env!("CARGO_BIN_EXE_chime-stop");
pub const CHIME_BIN: &str = env!("CARGO_BIN_EXE_chime");

/// Isolated project dir and lock dir for one test.
pub struct Sandbox {
    pub project: TempDir,
    pub locks: TempDir,
    env: Vec<(String, String)>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            project: tempfile::tempdir().unwrap(),
            locks: tempfile::tempdir().unwrap(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Run a binary with `stdin` and return (exit code, stdout, stderr).
    pub fn run(&self, bin: &str, args: &[&str], stdin: &str) -> (i32, String, String) {
        let mut command = Command::new(bin);
        command
            .args(args)
            .env("CLAUDE_PROJECT_DIR", self.project.path())
            .env("TMPDIR", self.locks.path())
            .env_remove("CHIME_ENABLE_TTS")
            .env_remove("CLAUDE_SUMMARY_TTL_SEC")
            .env_remove("CHIME_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.env {
            command.env(key, value);
        }

        let mut child = command.spawn().expect("failed to spawn binary");
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();

        let output = child.wait_with_output().unwrap();
        (
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }

    pub fn lock_path(&self, session_id: &str) -> PathBuf {
        self.locks
            .path()
            .join(format!("claude_summary_{session_id}.lock"))
    }

    pub fn read_lock(&self, session_id: &str) -> Option<serde_json::Value> {
        fs::read_to_string(self.lock_path(session_id))
            .ok()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    pub fn write_lock(&self, session_id: &str, lock: &serde_json::Value) {
        fs::write(self.lock_path(session_id), lock.to_string()).unwrap();
    }

    pub fn log_path(&self) -> PathBuf {
        self.project.path().join("logs").join("claude-hooks.log")
    }

    pub fn log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    pub fn write_project_config(&self, toml: &str) {
        let dir = self.project.path().join(".claude");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("chime.toml"), toml).unwrap();
    }
}

pub fn now_epoch() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

pub fn lock_json(stage: &str, run_id: &str, age_sec: f64) -> serde_json::Value {
    serde_json::json!({
        "version": 1,
        "stage": stage,
        "run_id": run_id,
        "ts": "2025-01-01T00:00:00Z",
        "ts_epoch": now_epoch() - age_sec,
        "ttl_sec": 600,
    })
}

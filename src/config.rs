//! Configuration loading for chime.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`<project_dir>/.claude/chime.toml`)
//! 3. Defaults (lowest priority)
//!
//! Configuration is built once at process start and threaded explicitly
//! into the runner, the hook log and the lock store. Loading never fails:
//! unreadable files and invalid values fall back to the lower layer.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChimeError, Result};

/// Default lock time-to-live in seconds.
pub const DEFAULT_SUMMARY_TTL_SEC: u64 = 600;

/// Directory (under the project dir) that holds the hook log.
pub const LOG_DIR_NAME: &str = "logs";

/// File name of the shared hook log.
pub const LOG_FILE_NAME: &str = "claude-hooks.log";

/// Project directory variable set by the host.
pub const ENV_PROJECT_DIR: &str = "CLAUDE_PROJECT_DIR";

/// Lock TTL override, in whole non-negative seconds.
///
/// A negative value is rejected like any other unparseable one: it is
/// logged and the lower layer's TTL is kept, never clamped or taken as an
/// always-expired window.
pub const ENV_SUMMARY_TTL_SEC: &str = "CLAUDE_SUMMARY_TTL_SEC";

/// Summary/TTS feature toggle override.
pub const ENV_ENABLE_TTS: &str = "CHIME_ENABLE_TTS";

/// Main configuration struct for chime.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base directory of `logs/claude-hooks.log`.
    pub project_dir: PathBuf,
    /// Whether the stop hook requests summaries at all.
    pub enable_tts: bool,
    /// Maximum lock age before it is discarded.
    pub summary_ttl_sec: u64,
    /// Directory holding per-session lock files.
    pub lock_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            enable_tts: true,
            summary_ttl_sec: DEFAULT_SUMMARY_TTL_SEC,
            lock_dir: env::temp_dir(),
        }
    }
}

/// Optional overrides read from the project config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub enable_tts: Option<bool>,
    pub summary_ttl_sec: Option<u64>,
    pub lock_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// The project dir comes from `CLAUDE_PROJECT_DIR`, falling back to the
    /// current working directory.
    pub fn load() -> Self {
        Self::load_from_project(&project_dir_from_env())
    }

    /// Load configuration for a specific project directory.
    pub fn load_from_project(project_dir: &Path) -> Self {
        let mut config = Self::for_project(project_dir);

        match Self::load_project_file(project_dir) {
            Ok(Some(file)) => config.apply_file(file),
            Ok(None) => {}
            Err(e) => tracing::warn!("ignoring project config: {}", e),
        }

        config.apply_env_overrides();
        config
    }

    /// Defaults only, rooted at `project_dir`. No file or environment reads.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Override the lock directory.
    pub fn with_lock_dir(mut self, lock_dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = lock_dir.into();
        self
    }

    /// Override the lock TTL.
    pub fn with_summary_ttl_sec(mut self, ttl: u64) -> Self {
        self.summary_ttl_sec = ttl;
        self
    }

    /// Override the feature toggle.
    pub fn with_enable_tts(mut self, enabled: bool) -> Self {
        self.enable_tts = enabled;
        self
    }

    /// Path of the project config file.
    pub fn project_file_path(project_dir: &Path) -> PathBuf {
        project_dir.join(".claude").join("chime.toml")
    }

    /// Directory holding the hook log.
    pub fn logs_dir(&self) -> PathBuf {
        self.project_dir.join(LOG_DIR_NAME)
    }

    /// Path of the shared hook log.
    pub fn log_file_path(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    /// Read the project config file, `Ok(None)` if it doesn't exist.
    fn load_project_file(project_dir: &Path) -> Result<Option<FileConfig>> {
        let path = Self::project_file_path(project_dir);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from_file(&path).map(Some)
    }

    /// Load config overrides from a specific file path.
    fn load_from_file(path: &Path) -> Result<FileConfig> {
        let content = fs::read_to_string(path).map_err(|e| ChimeError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| ChimeError::config(e.to_string()))
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(enabled) = file.enable_tts {
            self.enable_tts = enabled;
        }
        if let Some(ttl) = file.summary_ttl_sec {
            self.summary_ttl_sec = ttl;
        }
        if let Some(dir) = file.lock_dir {
            // Relative lock dirs are taken relative to the project.
            self.lock_dir = if dir.is_absolute() {
                dir
            } else {
                self.project_dir.join(dir)
            };
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Values that do not parse, including a negative TTL, are ignored with a
    /// warning.
    fn apply_env_overrides(&mut self) {
        // CLAUDE_SUMMARY_TTL_SEC
        if let Ok(val) = env::var(ENV_SUMMARY_TTL_SEC) {
            match val.trim().parse::<u64>() {
                Ok(n) => self.summary_ttl_sec = n,
                Err(_) => tracing::warn!(
                    "invalid {} value '{}', expected a non-negative integer; using '{}'",
                    ENV_SUMMARY_TTL_SEC,
                    val,
                    self.summary_ttl_sec
                ),
            }
        }

        // CHIME_ENABLE_TTS
        if let Ok(val) = env::var(ENV_ENABLE_TTS) {
            match parse_bool(&val) {
                Some(enabled) => self.enable_tts = enabled,
                None => tracing::warn!(
                    "invalid {} value '{}', expected true/false; using '{}'",
                    ENV_ENABLE_TTS,
                    val,
                    self.enable_tts
                ),
            }
        }
    }
}

/// Resolve the project directory from the environment.
fn project_dir_from_env() -> PathBuf {
    match env::var(ENV_PROJECT_DIR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Parse a loose boolean flag value.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        env::remove_var(ENV_PROJECT_DIR);
        env::remove_var(ENV_SUMMARY_TTL_SEC);
        env::remove_var(ENV_ENABLE_TTS);
    }

    fn write_project_file(dir: &Path, content: &str) {
        let path = Config::project_file_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.enable_tts);
        assert_eq!(config.summary_ttl_sec, 600);
        assert_eq!(config.lock_dir, env::temp_dir());
    }

    #[test]
    fn test_log_file_path() {
        let config = Config::for_project("/work/project");
        assert_eq!(
            config.log_file_path(),
            PathBuf::from("/work/project/logs/claude-hooks.log")
        );
    }

    #[test]
    fn test_builders() {
        let config = Config::for_project("/p")
            .with_lock_dir("/locks")
            .with_summary_ttl_sec(5)
            .with_enable_tts(false);

        assert_eq!(config.lock_dir, PathBuf::from("/locks"));
        assert_eq!(config.summary_ttl_sec, 5);
        assert!(!config.enable_tts);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chime.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    #[serial]
    fn test_project_file_overrides_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_file(
            dir.path(),
            "enable_tts = false\nsummary_ttl_sec = 42\nlock_dir = \"locks\"\n",
        );

        let config = Config::load_from_project(dir.path());

        assert!(!config.enable_tts);
        assert_eq!(config.summary_ttl_sec, 42);
        assert_eq!(config.lock_dir, dir.path().join("locks"));
    }

    #[test]
    #[serial]
    fn test_broken_project_file_falls_back_to_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_file(dir.path(), "summary_ttl_sec = \"soon\"");

        let config = Config::load_from_project(dir.path());

        assert_eq!(config.summary_ttl_sec, DEFAULT_SUMMARY_TTL_SEC);
        assert!(config.enable_tts);
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_file(dir.path(), "summary_ttl_sec = 42\nenable_tts = true\n");

        env::set_var(ENV_SUMMARY_TTL_SEC, "900");
        env::set_var(ENV_ENABLE_TTS, "false");

        let config = Config::load_from_project(dir.path());

        assert_eq!(config.summary_ttl_sec, 900);
        assert!(!config.enable_tts);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var(ENV_SUMMARY_TTL_SEC, "-5");
        env::set_var(ENV_ENABLE_TTS, "sometimes");

        let config = Config::load_from_project(dir.path());

        assert_eq!(config.summary_ttl_sec, DEFAULT_SUMMARY_TTL_SEC);
        assert!(config.enable_tts);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_negative_ttl_keeps_project_file_value() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_file(dir.path(), "summary_ttl_sec = 42\n");

        for value in ["-1", "-600", " -0.5 "] {
            env::set_var(ENV_SUMMARY_TTL_SEC, value);
            let config = Config::load_from_project(dir.path());
            assert_eq!(config.summary_ttl_sec, 42, "value {value:?}");
        }

        env::set_var(ENV_SUMMARY_TTL_SEC, " 0 ");
        assert_eq!(Config::load_from_project(dir.path()).summary_ttl_sec, 0);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_uses_claude_project_dir() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var(ENV_PROJECT_DIR, dir.path());

        let config = Config::load();

        assert_eq!(config.project_dir, dir.path());
        assert_eq!(
            config.log_file_path(),
            dir.path().join("logs").join("claude-hooks.log")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_project_dir_falls_back_to_cwd() {
        clear_env();
        env::set_var(ENV_PROJECT_DIR, "");

        let config = Config::load();

        assert_eq!(config.project_dir, env::current_dir().unwrap());

        clear_env();
    }
}

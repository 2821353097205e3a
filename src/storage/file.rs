//! File-based lock storage for chime.
//!
//! Locks are stored as compact JSON files named
//! `claude_summary_<session_id>.lock` in the lock directory (the system
//! temp dir by default). Atomic writes are achieved via temp file + rename.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::core::LockRecord;
use crate::error::{ChimeError, Result};
use crate::storage::LockStore;

/// Prefix of every lock file name.
pub const LOCK_FILE_PREFIX: &str = "claude_summary_";

/// File-based lock storage.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    /// Directory where lock files are stored.
    lock_dir: PathBuf,
}

impl FileLockStore {
    /// Create a store over `lock_dir`. The directory is created on first write.
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
        }
    }

    /// Get the path for a session's lock file.
    pub fn lock_path(&self, session_id: &str) -> PathBuf {
        self.lock_dir.join(format!(
            "{}{}.lock",
            LOCK_FILE_PREFIX,
            encode_session_id(session_id)
        ))
    }

    /// Get the sibling temp path used during atomic writes.
    fn temp_path(&self, session_id: &str) -> PathBuf {
        let mut name = self.lock_path(session_id).into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write a lock atomically using temp file + rename.
    fn atomic_write(&self, session_id: &str, record: &LockRecord) -> Result<()> {
        let final_path = self.lock_path(session_id);
        let temp_path = self.temp_path(session_id);

        let json = serde_json::to_string(record)?;

        if !self.lock_dir.exists() {
            fs::create_dir_all(&self.lock_dir)
                .map_err(|e| ChimeError::storage(&self.lock_dir, e))?;
        }

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| ChimeError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| ChimeError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| ChimeError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ChimeError::storage(&final_path, e));
        }

        Ok(())
    }
}

impl LockStore for FileLockStore {
    fn get(&self, session_id: &str) -> Result<Option<LockRecord>> {
        let path = self.lock_path(session_id);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ChimeError::storage(&path, e)),
        };

        let record = serde_json::from_str(&content).map_err(|e| {
            ChimeError::serde(format!("Failed to parse lock {}: {}", path.display(), e))
        })?;

        Ok(Some(record))
    }

    fn put(&self, session_id: &str, record: &LockRecord) -> Result<()> {
        self.atomic_write(session_id, record)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.lock_path(session_id);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChimeError::storage(&path, e)),
        }
    }
}

/// Make a session id safe to embed in a file name.
///
/// ASCII alphanumerics, `-` and `_` are kept. Every other byte of the UTF-8
/// encoding, `%` included, becomes `%XX`, so distinct ids never share a
/// lock file and no id can name a path outside the lock dir.
pub fn encode_session_id(session_id: &str) -> String {
    let mut encoded = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LockStage;
    use crate::storage::traits::tests::test_lock_store_crud;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_store() -> (FileLockStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileLockStore::new(dir.path());
        (store, dir)
    }

    #[test]
    fn test_file_lock_store_crud() {
        let (store, _dir) = create_test_store();
        test_lock_store_crud(&store);
    }

    #[test]
    fn test_lock_path() {
        let store = FileLockStore::new("/tmp");
        assert_eq!(
            store.lock_path("6f1c-42"),
            PathBuf::from("/tmp/claude_summary_6f1c-42.lock")
        );
        assert_eq!(
            store.temp_path("6f1c-42"),
            PathBuf::from("/tmp/claude_summary_6f1c-42.lock.tmp")
        );
    }

    #[test]
    fn test_lock_path_encodes_session_id() {
        let store = FileLockStore::new("/tmp");
        assert_eq!(
            store.lock_path("../etc/passwd"),
            PathBuf::from("/tmp/claude_summary_%2E%2E%2Fetc%2Fpasswd.lock")
        );
        assert_eq!(
            store.lock_path("sess 100%"),
            PathBuf::from("/tmp/claude_summary_sess%20100%25.lock")
        );
        assert_eq!(encode_session_id("caf\u{e9}"), "caf%C3%A9");
    }

    #[test]
    fn test_similar_session_ids_get_distinct_locks() {
        let (store, _dir) = create_test_store();
        let ids = ["a.b", "a/b", "a_b", "a b", "a%2Eb", "a%2Fb"];

        let paths: std::collections::HashSet<PathBuf> =
            ids.iter().map(|id| store.lock_path(id)).collect();
        assert_eq!(paths.len(), ids.len());

        for id in ids {
            store
                .put(id, &LockRecord::requested(Utc::now(), 600))
                .unwrap();
        }
        store
            .put("a.b", &LockRecord::requested(Utc::now(), 600).with_stage(LockStage::Done))
            .unwrap();

        assert_eq!(store.get("a.b").unwrap().unwrap().stage, LockStage::Done);
        for id in &ids[1..] {
            assert_eq!(store.get(id).unwrap().unwrap().stage, LockStage::Requested);
        }

        store.delete("a/b").unwrap();
        assert!(store.exists("a_b").unwrap());
        assert!(!store.exists("a/b").unwrap());
    }

    #[test]
    fn test_put_writes_compact_json() {
        let (store, _dir) = create_test_store();
        let record = LockRecord::requested(Utc::now(), 600);
        store.put("s1", &record).unwrap();

        let content = fs::read_to_string(store.lock_path("s1")).unwrap();
        assert!(!content.contains('\n'));
        assert!(content.contains(r#""stage":"requested""#));
        assert!(content.contains(&record.run_id));
    }

    #[test]
    fn test_put_replaces_existing() {
        let (store, _dir) = create_test_store();
        let record = LockRecord::requested(Utc::now(), 600);
        store.put("s1", &record).unwrap();
        store.put("s1", &record.with_stage(LockStage::Done)).unwrap();

        let stored = store.get("s1").unwrap().unwrap();
        assert_eq!(stored.stage, LockStage::Done);
        assert_eq!(stored.run_id, record.run_id);
    }

    #[test]
    fn test_temp_file_cleaned_up() {
        let (store, _dir) = create_test_store();
        store
            .put("s1", &LockRecord::requested(Utc::now(), 600))
            .unwrap();

        assert!(store.lock_path("s1").exists());
        assert!(!store.temp_path("s1").exists());
    }

    #[test]
    fn test_put_creates_missing_lock_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileLockStore::new(dir.path().join("nested").join("locks"));

        store
            .put("s1", &LockRecord::requested(Utc::now(), 600))
            .unwrap();

        assert!(store.lock_path("s1").exists());
    }

    #[test]
    fn test_get_corrupt_lock_is_error() {
        let (store, _dir) = create_test_store();
        fs::write(store.lock_path("s1"), "{not json").unwrap();

        let err = store.get("s1").unwrap_err();
        assert!(matches!(err, ChimeError::Serde { .. }));
    }

    #[test]
    fn test_get_reads_foreign_lock() {
        let (store, _dir) = create_test_store();
        fs::write(
            store.lock_path("s1"),
            r#"{"version":1,"stage":"done","run_id":"abc","ts":"2025-01-01T00:00:00Z","ts_epoch":1735689600.0,"ttl_sec":600}"#,
        )
        .unwrap();

        let record = store.get("s1").unwrap().unwrap();
        assert_eq!(record.stage, LockStage::Done);
        assert_eq!(record.run_id, "abc");
    }

    #[test]
    fn test_put_fails_when_lock_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = FileLockStore::new(&blocker);

        let result = store.put("s1", &LockRecord::requested(Utc::now(), 600));
        assert!(matches!(result, Err(ChimeError::Storage { .. })));
    }
}

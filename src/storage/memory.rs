//! In-memory lock storage for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::LockRecord;
use crate::error::{ChimeError, Result};
use crate::storage::LockStore;

/// In-memory lock store for testing.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Writes can be made
/// to fail with [`MemoryLockStore::fail_writes`] to exercise fail-open
/// paths.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    locks: RwLock<HashMap<String, LockRecord>>,
    fail_writes: RwLock<bool>,
}

impl MemoryLockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of locks in the store.
    pub fn len(&self) -> usize {
        self.locks.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.locks.read().unwrap().is_empty()
    }

    /// Make every subsequent `put` fail.
    pub fn fail_writes(&self) {
        *self.fail_writes.write().unwrap() = true;
    }
}

impl LockStore for MemoryLockStore {
    fn get(&self, session_id: &str) -> Result<Option<LockRecord>> {
        let locks = self.locks.read().unwrap();
        Ok(locks.get(session_id).cloned())
    }

    fn put(&self, session_id: &str, record: &LockRecord) -> Result<()> {
        if *self.fail_writes.read().unwrap() {
            return Err(ChimeError::storage(
                session_id,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "writes disabled"),
            ));
        }
        let mut locks = self.locks.write().unwrap();
        locks.insert(session_id.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let mut locks = self.locks.write().unwrap();
        locks.remove(session_id);
        Ok(())
    }
}

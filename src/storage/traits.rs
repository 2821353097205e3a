//! Lock storage traits for chime.

use crate::core::LockRecord;
use crate::error::Result;

/// Trait for lock storage backends.
///
/// One lock per session id. Implementations must make `put` atomic with
/// respect to concurrent readers.
pub trait LockStore: Send + Sync {
    /// Retrieve the lock for a session.
    ///
    /// Returns `Ok(None)` if no lock exists, and an error if one exists but
    /// cannot be read or parsed.
    fn get(&self, session_id: &str) -> Result<Option<LockRecord>>;

    /// Create or replace the lock for a session.
    fn put(&self, session_id: &str, record: &LockRecord) -> Result<()>;

    /// Delete the lock for a session.
    ///
    /// Returns `Ok(())` even if no lock exists.
    fn delete(&self, session_id: &str) -> Result<()>;

    /// Check if a readable lock exists.
    fn exists(&self, session_id: &str) -> Result<bool> {
        Ok(self.get(session_id)?.is_some())
    }
}

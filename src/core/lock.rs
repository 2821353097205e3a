//! Per-session summary lock record.
//!
//! The lock is a small JSON document used purely as a dedup flag: it
//! records that a summary was requested for a session and when. Its
//! lifecycle state is derived from the stored `stage` and the record's age
//! against the configured TTL.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ChimeError;

/// Current lock schema version.
pub const LOCK_VERSION: u32 = 1;

/// Stage of the downstream summary workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStage {
    /// Summary requested, not yet reported back.
    #[default]
    Requested,
    /// Downstream workflow finished.
    Done,
    /// Downstream workflow gave up.
    Failed,
}

impl LockStage {
    /// Whether the downstream workflow reached a final stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LockStage::Done | LockStage::Failed)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockStage::Requested => "requested",
            LockStage::Done => "done",
            LockStage::Failed => "failed",
        }
    }
}

impl fmt::Display for LockStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockStage {
    type Err = ChimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requested" => Ok(LockStage::Requested),
            "done" => Ok(LockStage::Done),
            "failed" => Ok(LockStage::Failed),
            _ => Err(ChimeError::invalid_stage(s)),
        }
    }
}

// Stages written by other tools are read leniently: anything that is not a
// terminal stage keeps the lock in flight.
impl<'de> Deserialize<'de> for LockStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Persisted lock document.
///
/// Other tools may rewrite the lock, so only `ts_epoch` and `stage` are
/// load-bearing. The informational fields fall back to their defaults when
/// missing or mistyped instead of failing the whole parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LockRecord {
    /// Schema version.
    #[serde(deserialize_with = "lenient_u32")]
    pub version: u32,
    /// Workflow stage.
    pub stage: LockStage,
    /// Identifier of this notification attempt.
    #[serde(deserialize_with = "lenient_string")]
    pub run_id: String,
    /// Creation time, `%Y-%m-%dT%H:%M:%SZ` in UTC.
    #[serde(deserialize_with = "lenient_string")]
    pub ts: String,
    /// Creation time in seconds since the Unix epoch.
    #[serde(deserialize_with = "epoch_from_value")]
    pub ts_epoch: f64,
    /// TTL in effect when the lock was created.
    #[serde(deserialize_with = "lenient_u64")]
    pub ttl_sec: u64,
}

impl LockRecord {
    /// A fresh `requested` lock with a new run id.
    pub fn requested(now: DateTime<Utc>, ttl_sec: u64) -> Self {
        Self {
            version: LOCK_VERSION,
            stage: LockStage::Requested,
            run_id: uuid::Uuid::new_v4().to_string(),
            ts: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ts_epoch: epoch_seconds(now),
            ttl_sec,
        }
    }

    /// Seconds elapsed since the lock was created.
    pub fn age_at(&self, now_epoch: f64) -> f64 {
        now_epoch - self.ts_epoch
    }

    /// Derive the lifecycle state. Expiry wins over stage.
    pub fn state_at(&self, now_epoch: f64, ttl_sec: u64) -> LockState {
        if self.age_at(now_epoch) > ttl_sec as f64 {
            LockState::Expired
        } else if self.stage.is_terminal() {
            LockState::ActiveTerminal
        } else {
            LockState::ActiveRequested
        }
    }

    /// Copy of this record at a different stage.
    pub fn with_stage(&self, stage: LockStage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }
}

/// Derived lock state for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// No lock file.
    Absent,
    /// Requested and within TTL.
    ActiveRequested,
    /// Done or failed and within TTL.
    ActiveTerminal,
    /// Older than the TTL.
    Expired,
}

/// Non-negative integer from a number or numeric string, else zero.
fn value_as_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(value_as_u64(&Value::deserialize(deserializer)?))
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = value_as_u64(&Value::deserialize(deserializer)?);
    Ok(u32::try_from(n).unwrap_or_default())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// `ts_epoch` decides expiry, so it must be a finite number or a numeric
/// string; anything else makes the lock unreadable.
fn epoch_from_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let epoch = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    epoch
        .filter(|f| f.is_finite())
        .ok_or_else(|| D::Error::custom(format!("invalid ts_epoch: {}", value)))
}

/// Float seconds since the Unix epoch.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

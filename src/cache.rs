// SPDX-License-Identifier: PMPL-1.0-or-later

//! Expiring key-value cache, one JSON file per entry name.
//!
//! Entries are stored as `{"data": <value>, "timestamp": <epoch seconds>}`
//! under a fixed directory created on first write. Reads are best-effort:
//! an absent or malformed entry is treated as empty, never as an error.
//! Callers that can regenerate the data persist with `let _ = ...` so a
//! cache failure never interrupts a scan.
//!
//! There is no locking. One writer per entry name per process run is
//! assumed; concurrent scans racing on the same name are unsupported.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
    timestamp: f64,
}

/// Current time as float epoch seconds. Microsecond resolution, so an
/// immediate expiry check against a zero-hour window sees a positive age.
fn now_epoch() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

/// Handle over one cache directory. Cheap to clone; each service owns
/// its own handle.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Stored data for `name`, or `T::default()` when the entry is
    /// absent, unreadable, or malformed.
    pub fn read<T>(&self, name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match fs::read_to_string(self.entry_path(name)) {
            Ok(raw) => raw,
            Err(_) => return T::default(),
        };
        match serde_json::from_str::<Envelope<T>>(&raw) {
            Ok(envelope) => envelope.data,
            Err(_) => T::default(),
        }
    }

    /// Store `data` under `name`, stamped with the current time.
    /// Overwrites any prior entry; creates the cache directory if needed.
    pub fn write<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating cache directory {}", self.dir.display()))?;
        let envelope = Envelope {
            data,
            timestamp: now_epoch(),
        };
        let path = self.entry_path(name);
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(&path, json).with_context(|| format!("writing cache entry {}", path.display()))?;
        Ok(())
    }

    /// True when no entry exists, the entry is unreadable, or it is older
    /// than `max_age_hours`. A never-written entry is always expired.
    pub fn is_expired(&self, name: &str, max_age_hours: u64) -> bool {
        let raw = match fs::read_to_string(self.entry_path(name)) {
            Ok(raw) => raw,
            Err(_) => return true,
        };
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) => return true,
        };
        match value.get("timestamp").and_then(|t| t.as_f64()) {
            Some(written_at) => now_epoch() - written_at > (max_age_hours * 3600) as f64,
            None => true,
        }
    }
}

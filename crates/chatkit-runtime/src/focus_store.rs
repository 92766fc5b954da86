#![forbid(unsafe_code)]

//! Session-scoped focus persistence.
//!
//! Remembers which named element in which fragment held keyboard focus,
//! so a later full reattachment (reopening the drawer, a page
//! navigation within the session) can restore it. This is best-effort
//! UX, not correctness-critical: the one record is overwritten on every
//! store, and a malformed or missing value reads as `None` — a
//! restoration attempt must never fail loudly because of it.
//!
//! Backends follow the same pattern as widget state storage elsewhere
//! in the workspace: an always-available in-memory store (also the
//! injectable fake for tests) and a JSON session file written with the
//! atomic write-then-rename pattern.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The single persisted value: fragment id plus target name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRecord {
    pub fragment_id: String,
    pub target_name: String,
}

impl FocusRecord {
    #[must_use]
    pub fn new(fragment_id: &str, target_name: &str) -> Self {
        Self {
            fragment_id: fragment_id.to_string(),
            target_name: target_name.to_string(),
        }
    }
}

/// Session-scoped focus persistence.
///
/// `set` overwrites (never merges); `get` tolerates stale or absent
/// values. Write failures are swallowed with a diagnostic — losing a
/// focus record costs one keyboard round trip, nothing more.
pub trait FocusStore {
    fn get(&self) -> Option<FocusRecord>;
    fn set(&mut self, record: &FocusRecord);
    fn clear(&mut self);
}

// ─────────────────────────────────────────────────────────────────────
// Memory store
// ─────────────────────────────────────────────────────────────────────

/// In-memory store; the injectable fake for tests and the default for
/// hosts without session persistence.
#[derive(Debug, Default)]
pub struct MemoryFocusStore {
    raw: Option<String>,
}

impl MemoryFocusStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the raw stored value, valid JSON or not. Lets tests
    /// exercise the malformed-data path.
    pub fn set_raw(&mut self, raw: &str) {
        self.raw = Some(raw.to_string());
    }
}

impl FocusStore for MemoryFocusStore {
    fn get(&self) -> Option<FocusRecord> {
        let raw = self.raw.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed focus record");
                None
            }
        }
    }

    fn set(&mut self, record: &FocusRecord) {
        match serde_json::to_string(record) {
            Ok(raw) => self.raw = Some(raw),
            Err(err) => tracing::warn!(error = %err, "failed to serialize focus record"),
        }
    }

    fn clear(&mut self) {
        self.raw = None;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Session file store
// ─────────────────────────────────────────────────────────────────────

/// JSON file-backed store for hosts that persist the browser session.
///
/// Writes go through a temp file plus rename so a crash mid-write
/// leaves either the old record or the new one, never a torn file.
#[derive(Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

impl FocusStore for SessionFile {
    fn get(&self) -> Option<FocusRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(error = %err, path = %self.path.display(),
                    "ignoring malformed focus record");
                None
            }
        }
    }

    fn set(&mut self, record: &FocusRecord) {
        let result: std::io::Result<()> = (|| {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp = self.temp_path();
            {
                let file = File::create(&tmp)?;
                let mut writer = BufWriter::new(file);
                let raw = serde_json::to_string(record)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                writer.write_all(raw.as_bytes())?;
                writer.flush()?;
            }
            fs::rename(&tmp, &self.path)
        })();
        if let Err(err) = result {
            tracing::warn!(error = %err, path = %self.path.display(),
                "failed to persist focus record");
        }
    }

    fn clear(&mut self) {
        if self.path.exists()
            && let Err(err) = fs::remove_file(&self.path)
        {
            tracing::warn!(error = %err, "failed to clear focus record");
        }
    }
}

//! Quarantine record types.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `strftime` format of quarantine timestamps (`YYYYMMDD_HHMMSS`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension appended to a stored file name to form its sidecar name.
pub const SIDECAR_EXTENSION: &str = "json";

/// Formats a quarantine timestamp.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns the sidecar path for a stored file.
pub fn sidecar_path(stored: &Path) -> PathBuf {
    let mut name = stored.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Sidecar metadata written next to every quarantined file.
///
/// On disk this is `{"original": ..., "time": ..., "stored_filename": ..., "blake3": ...}`.
/// Only `original` and `time` are required so that older sidecars still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    /// Path of the file before it was moved, exactly as reported.
    pub original: String,

    /// When the file was quarantined, `YYYYMMDD_HHMMSS`.
    pub time: String,

    /// Name of the moved file inside the quarantine directory.
    #[serde(default)]
    pub stored_filename: String,

    /// BLAKE3 digest of the quarantined content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blake3: Option<String>,
}

impl QuarantineRecord {
    /// Creates a new record.
    pub fn new(
        original: impl Into<String>,
        time: impl Into<String>,
        stored_filename: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            time: time.into(),
            stored_filename: stored_filename.into(),
            blake3: None,
        }
    }

    /// Sets the content digest.
    pub fn with_blake3(mut self, digest: impl Into<String>) -> Self {
        self.blake3 = Some(digest.into());
        self
    }

    /// Returns the original location as a path.
    pub fn original_path(&self) -> &Path {
        Path::new(&self.original)
    }

    /// Parses `time` back into a local timestamp, if well formed.
    pub fn quarantined_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, TIMESTAMP_FORMAT).ok()
    }
}

/// A listed quarantine entry: the parsed sidecar plus where things live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineEntry {
    /// Parsed sidecar.
    pub record: QuarantineRecord,

    /// Path of the quarantined file.
    pub stored_path: PathBuf,

    /// Path of the sidecar.
    pub sidecar_path: PathBuf,
}

impl QuarantineEntry {
    /// Returns the `(timestamp, original path)` pair shown in listings.
    pub fn display_pair(&self) -> (&str, &str) {
        (&self.record.time, &self.record.original)
    }
}

impl std::fmt::Display for QuarantineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.record.time, self.record.original)
    }
}

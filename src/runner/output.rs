//! Classification of scanner output lines.
//!
//! The scanner prints one line per reported file (`<path>: <signature> FOUND`
//! in infected-only mode) followed by a summary block containing
//! `Scanned files: <n>`.

use crate::core::{Completion, ScanResult};

use std::path::PathBuf;

/// Marker of the summary line carrying the scanned-file total.
pub const SCANNED_FILES_MARKER: &str = "Scanned files:";

/// Marker of a line reporting an infected file.
pub const FOUND_MARKER: &str = "FOUND";

/// What a single output line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanLine<'a> {
    /// Summary line. `None` when the count could not be parsed.
    ScannedTotal(Option<u64>),

    /// An infected file, by path.
    Infected(&'a str),

    /// Anything else; shown, not interpreted.
    Progress,
}

/// Classifies a trimmed line. The first matching rule wins.
pub fn classify(line: &str) -> ScanLine<'_> {
    if let Some((_, count)) = line.split_once(SCANNED_FILES_MARKER) {
        return ScanLine::ScannedTotal(count.trim().parse().ok());
    }

    if line.contains(FOUND_MARKER) {
        let path = line.split_once(':').map_or(line, |(path, _)| path).trim();
        return ScanLine::Infected(path);
    }

    ScanLine::Progress
}

/// Rebuilds the path of an infected-file line from the raw output bytes.
///
/// `reported` is the path [`classify`] extracted from the lossily decoded
/// line. On unix the raw bytes are used instead, so a file name that is not
/// valid UTF-8 still names the file on disk.
#[cfg(unix)]
pub fn infected_path(raw: &[u8], _reported: &str) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let line = raw.trim_ascii();
    let end = line.iter().position(|&b| b == b':').unwrap_or(line.len());
    PathBuf::from(OsStr::from_bytes(line[..end].trim_ascii()))
}

/// Rebuilds the path of an infected-file line from the raw output bytes.
#[cfg(not(unix))]
pub fn infected_path(_raw: &[u8], reported: &str) -> PathBuf {
    PathBuf::from(reported)
}

/// Running totals for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanTally {
    /// Last successfully parsed scanned-file total.
    pub scanned: u64,

    /// Infected paths, in report order.
    pub infected: Vec<PathBuf>,

    /// Files successfully moved to quarantine.
    pub quarantined: u64,
}

impl ScanTally {
    /// Builds the final statistics.
    pub fn result(&self) -> ScanResult {
        ScanResult::new(self.scanned, self.infected.len() as u64)
    }

    /// Builds the terminal completion.
    pub fn completion(&self, auto_quarantine: bool) -> Completion {
        if self.infected.is_empty() {
            Completion::Clean {
                scanned: self.scanned,
            }
        } else {
            Completion::ThreatsFound {
                infected: self.infected.len() as u64,
                quarantined: auto_quarantine.then_some(self.quarantined),
            }
        }
    }
}

//! Core types used throughout clamkeeper.
//!
//! This module defines the scan request handed to the scan runner, the
//! summary produced once a scan finishes, and the terminal completion
//! reported by every job.

use crate::i18n::{Catalog, Locale};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What to scan and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// File or directory handed to the scanner.
    pub path: PathBuf,

    /// Whether the scanner descends into subdirectories.
    pub recursive: bool,

    /// Whether infected files are moved to quarantine as they are reported.
    pub auto_quarantine: bool,
}

impl ScanRequest {
    /// Creates a recursive, auto-quarantining request for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            auto_quarantine: true,
        }
    }

    /// Creates a request for a single file (no recursion).
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path).with_recursive(false)
    }

    /// Creates a request for a folder (recursive).
    pub fn folder(path: impl Into<PathBuf>) -> Self {
        Self::new(path)
    }

    /// Picks [`ScanRequest::folder`] or [`ScanRequest::file`] depending on what
    /// `path` currently points at.
    pub fn for_target(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::folder(path)
        } else {
            Self::file(path)
        }
    }

    /// Sets recursion.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Enables or disables automatic quarantine.
    pub fn with_auto_quarantine(mut self, enabled: bool) -> Self {
        self.auto_quarantine = enabled;
        self
    }
}

/// Returns the directory a quick scan should cover.
///
/// The first existing candidate of `~/Downloads` and `~/Desktop` wins.
pub fn quick_scan_target(home: &Path) -> Option<PathBuf> {
    ["Downloads", "Desktop"]
        .iter()
        .map(|dir| home.join(dir))
        .find(|candidate| candidate.exists())
}

/// Summary of a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Total reported by the scanner's summary line (0 if none was printed).
    pub scanned_count: u64,

    /// Number of lines reporting an infected file.
    pub infected_count: u64,

    /// When the scan finished.
    pub timestamp: DateTime<Local>,
}

impl ScanResult {
    /// Creates a result stamped with the current time.
    pub fn new(scanned_count: u64, infected_count: u64) -> Self {
        Self {
            scanned_count,
            infected_count,
            timestamp: Local::now(),
        }
    }

    /// Returns `true` if no infected file was reported.
    pub fn is_clean(&self) -> bool {
        self.infected_count == 0
    }

    /// Renders the statistics line in `locale`.
    pub fn render(&self, locale: Locale) -> String {
        format!(
            "{} {} | {} {}",
            Catalog::lookup(locale, "files_scanned"),
            self.scanned_count,
            Catalog::lookup(locale, "infected"),
            self.infected_count
        )
    }
}

/// Terminal outcome of a scan or update job.
///
/// Exactly one completion is delivered per job, always as its last event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Completion {
    /// The scan finished without infected files.
    Clean {
        /// Files the scanner reported as scanned.
        scanned: u64,
    },

    /// The scan reported infected files.
    ThreatsFound {
        /// Number of infected files reported.
        infected: u64,
        /// Files actually moved to quarantine, when auto-quarantine was on.
        quarantined: Option<u64>,
    },

    /// The updater ran (whatever its exit code).
    UpdateComplete,

    /// The job was cancelled before the subprocess finished.
    Cancelled,

    /// The job could not run.
    Failed {
        /// Error text.
        error: String,
    },
}

impl Completion {
    /// Creates a `Failed` completion from any displayable error.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    /// Returns `true` for success-classified completions.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Clean { .. } | Self::UpdateComplete)
    }

    /// Renders the user-facing message in `locale`.
    pub fn render(&self, locale: Locale) -> String {
        match self {
            Self::Clean { scanned } => {
                Catalog::format(locale, "scan_clean", &[("count", scanned.to_string())])
            }
            Self::ThreatsFound {
                infected,
                quarantined,
            } => {
                let mut message =
                    Catalog::format(locale, "threats_found", &[("count", infected.to_string())]);
                if let Some(moved) = quarantined {
                    message.push('\n');
                    message.push_str(&Catalog::format(
                        locale,
                        "moved_to_quarantine",
                        &[("count", moved.to_string())],
                    ));
                }
                message
            }
            Self::UpdateComplete => Catalog::lookup(locale, "update_complete").to_string(),
            Self::Cancelled => Catalog::lookup(locale, "cancelled").to_string(),
            Self::Failed { error } => {
                Catalog::format(locale, "error_message", &[("error", error.clone())])
            }
        }
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Locale::En))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_request_builders() {
        let file = ScanRequest::file("/tmp/a.txt");
        assert!(!file.recursive);
        assert!(file.auto_quarantine);

        let folder = ScanRequest::folder("/tmp").with_auto_quarantine(false);
        assert!(folder.recursive);
        assert!(!folder.auto_quarantine);
    }

    #[test]
    fn test_for_target_checks_kind() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.bin");
        std::fs::write(&file, b"x").unwrap();

        assert!(ScanRequest::for_target(dir.path()).recursive);
        assert!(!ScanRequest::for_target(&file).recursive);
    }

    #[test]
    fn test_quick_scan_target_prefers_downloads() {
        let home = TempDir::new().unwrap();
        assert_eq!(quick_scan_target(home.path()), None);

        std::fs::create_dir(home.path().join("Desktop")).unwrap();
        assert_eq!(
            quick_scan_target(home.path()),
            Some(home.path().join("Desktop"))
        );

        std::fs::create_dir(home.path().join("Downloads")).unwrap();
        assert_eq!(
            quick_scan_target(home.path()),
            Some(home.path().join("Downloads"))
        );
    }

    #[test]
    fn test_completion_classification() {
        assert!(Completion::Clean { scanned: 3 }.is_success());
        assert!(Completion::UpdateComplete.is_success());
        assert!(!Completion::Cancelled.is_success());
        assert!(!Completion::failed("boom").is_success());
        assert!(!Completion::ThreatsFound {
            infected: 1,
            quarantined: Some(1)
        }
        .is_success());
    }

    #[test]
    fn test_completion_messages() {
        let found = Completion::ThreatsFound {
            infected: 1,
            quarantined: Some(1),
        };
        let text = found.to_string();
        assert!(text.contains("1 infected file(s) found"));
        assert!(text.contains("1 moved to quarantine"));

        let not_moved = Completion::ThreatsFound {
            infected: 2,
            quarantined: None,
        };
        assert!(!not_moved.to_string().contains("quarantine"));

        assert_eq!(
            Completion::Clean { scanned: 42 }.to_string(),
            "42 files scanned. No threats."
        );
        assert_eq!(Completion::failed("boom").to_string(), "Error: boom");
    }

    #[test]
    fn test_completion_renders_portuguese() {
        let text = Completion::UpdateComplete.render(Locale::Pt);
        assert_eq!(text, "Atualização concluída!");
    }

    #[test]
    fn test_scan_result_render() {
        let result = ScanResult::new(10, 2);
        assert_eq!(result.render(Locale::En), "Files scanned: 10 | Infected: 2");
        assert!(!result.is_clean());
    }
}

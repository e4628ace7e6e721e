//! Error types for clamkeeper.
//!
//! This module provides structured, typed errors for every failure the
//! runners, the quarantine store and the preference store can report.
//! The library never panics; all errors are returned as `Result` values.

use crate::core::event::JobKind;

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for runner operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The external program could not be started.
    #[error("failed to launch '{program}': {source}")]
    LaunchFailed {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A job of the same kind is still running.
    #[error("a {kind} job is already running")]
    AlreadyRunning {
        /// Kind of the job that is still active.
        kind: JobKind,
    },

    /// The scan engine is not installed and could not be installed.
    #[error("required program '{program}' is not available: {reason}")]
    MissingDependency {
        /// Program that was probed.
        program: String,
        /// Human-readable reason.
        reason: String,
    },

    /// An I/O error occurred while talking to a subprocess.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl RunnerError {
    /// Creates a `LaunchFailed` error.
    pub fn launch_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::LaunchFailed {
            program: program.into(),
            source,
        }
    }

    /// Creates a `MissingDependency` error.
    pub fn missing_dependency(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingDependency {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Error type for quarantine operations.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// Failed to move the file into quarantine.
    #[error("failed to store file in quarantine: {reason}")]
    StoreFailed {
        /// Reason for the failure.
        reason: String,
    },

    /// No quarantine entry with this stored name.
    #[error("quarantine entry not found: {stored_filename}")]
    NotFound {
        /// The stored file name that was looked up.
        stored_filename: String,
    },

    /// The original location is occupied, so the file cannot be restored.
    #[error("cannot restore, {} already exists", path.display())]
    RestoreTargetExists {
        /// The occupied original path.
        path: PathBuf,
    },

    /// The path cannot be quarantined (no file name, not UTF-8, ...).
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A sidecar record could not be parsed or written.
    #[error("malformed sidecar {}: {reason}", path.display())]
    MalformedRecord {
        /// Path of the sidecar.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File integrity check failed.
    #[error("file integrity check failed: expected {expected}, got {actual}")]
    IntegrityCheckFailed {
        /// Expected hash.
        expected: String,
        /// Actual hash.
        actual: String,
    },
}

impl QuarantineError {
    /// Creates a `StoreFailed` error.
    pub fn store_failed(reason: impl Into<String>) -> Self {
        Self::StoreFailed {
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidPath` error.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for the persisted preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A preference file could not be (de)serialized.
    #[error("invalid preference file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A specialized `Result` type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// A specialized `Result` type for quarantine operations.
pub type QuarantineResult<T> = Result<T, QuarantineError>;

/// A specialized `Result` type for preference operations.
pub type PreferencesResult<T> = Result<T, PreferencesError>;

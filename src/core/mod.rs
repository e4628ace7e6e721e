//! Core types for clamkeeper.
//!
//! - [`types`] - Scan request, scan summary and job completion
//! - [`event`] - Events streamed from a job to the presentation loop
//! - [`config`] - External program configuration
//! - [`error`] - Structured error types

pub mod config;
pub mod error;
pub mod event;
pub mod types;

pub use config::{default_config_root, EngineConfig, CONFIG_DIR_NAME, RELEASES_URL};
pub use error::{
    PreferencesError, PreferencesResult, QuarantineError, QuarantineResult, RunnerError,
    RunnerResult,
};
pub use event::{EventSender, JobKind, RunnerEvent};
pub use types::{quick_scan_target, Completion, ScanRequest, ScanResult};

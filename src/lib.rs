//! # Clamkeeper
//!
//! A front end for the ClamAV command-line scanner with automatic quarantine.
//!
//! ## Overview
//!
//! Clamkeeper drives the external `clamscan` and `freshclam` programs and
//! turns their output into a stream of events:
//!
//! - Scans stream scanner output line by line and move every file reported
//!   as infected into a quarantine directory as soon as it is reported
//! - Each quarantined file gets a JSON sidecar recording where it came from
//! - Signature updates treat "already up to date" as success
//! - Quarantined files can be listed, restored or deleted
//! - User-facing text is available in English and Portuguese
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clamkeeper::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = clamkeeper::core::default_config_root(std::path::Path::new("/home/ana"));
//!     let store = Arc::new(FilesystemQuarantine::new(&root));
//!     let supervisor = Supervisor::new(EngineConfig::default(), store);
//!
//!     let mut job = supervisor.start_scan(ScanRequest::folder("/home/ana/Downloads"))?;
//!     while let Some(event) = job.next_event().await {
//!         if let RunnerEvent::Finished(completion) = event {
//!             println!("{completion}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: Requests, results, events, configuration and errors
//! - **Runner**: Subprocess drivers for the scanner and the updater
//! - **Manager**: Background jobs, one per kind at a time, with cancellation
//! - **Quarantine**: File moves plus sidecar metadata
//! - **Audit**: Structured log events for scans and quarantine operations
//! - **I18n**: Translation tables with English fallback
//! - **Preferences**: Language choice and first-run marker

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod bootstrap;
pub mod core;
pub mod i18n;
pub mod manager;
pub mod preferences;
pub mod quarantine;
pub mod runner;
pub mod version;

// Re-export commonly used types at the crate root
pub use crate::core::{
    Completion, EngineConfig, EventSender, JobKind, QuarantineError, RunnerError, RunnerEvent,
    ScanRequest, ScanResult,
};

pub use crate::i18n::{Catalog, Locale};
pub use crate::manager::{JobHandle, Supervisor};
pub use crate::preferences::PreferenceStore;
pub use crate::quarantine::{FilesystemQuarantine, QuarantineEntry, QuarantineRecord, QuarantineStore};
pub use crate::runner::{ScanRunner, UpdateRunner};

/// Prelude module for convenient imports.
///
/// ```rust
/// use clamkeeper::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        Completion, EngineConfig, EventSender, JobKind, QuarantineError, RunnerError,
        RunnerEvent, ScanRequest, ScanResult,
    };
    pub use crate::i18n::{Catalog, Locale};
    pub use crate::manager::{JobHandle, Supervisor};
    pub use crate::preferences::PreferenceStore;
    pub use crate::quarantine::{
        FilesystemQuarantine, QuarantineEntry, QuarantineRecord, QuarantineStore,
    };
    pub use crate::runner::{ScanRunner, UpdateRunner};
}

//! Quarantine storage for infected files.
//!
//! This module provides a trait-based abstraction for quarantine storage
//! and the filesystem store used by the application.

mod filesystem;
mod record;
mod traits;

pub use filesystem::{FilesystemQuarantine, QUARANTINE_DIR_NAME};
pub use record::{
    format_timestamp, sidecar_path, QuarantineEntry, QuarantineRecord, SIDECAR_EXTENSION,
    TIMESTAMP_FORMAT,
};
pub use traits::QuarantineStore;

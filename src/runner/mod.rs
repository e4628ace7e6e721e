//! Subprocess runners.
//!
//! - [`scan`] - Streams scanner output and quarantines infected files
//! - [`update`] - Runs the signature updater
//! - [`output`] - Scanner output classification

pub mod output;
pub mod scan;
pub mod update;

pub use output::{classify, ScanLine, ScanTally, FOUND_MARKER, SCANNED_FILES_MARKER};
pub use scan::ScanRunner;
pub use update::UpdateRunner;

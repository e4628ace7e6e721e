//! Quarantine store trait definition.

use crate::core::error::QuarantineError;
use crate::quarantine::record::QuarantineEntry;

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Trait for quarantine storage implementations.
///
/// The scan runner only depends on this trait, so tests and embedders can
/// swap in their own storage.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use clamkeeper::quarantine::{QuarantineEntry, QuarantineStore};
/// use clamkeeper::core::QuarantineError;
/// use async_trait::async_trait;
/// use std::path::{Path, PathBuf};
///
/// #[derive(Debug)]
/// struct MyQuarantineStore;
///
/// #[async_trait]
/// impl QuarantineStore for MyQuarantineStore {
///     async fn quarantine(&self, path: &Path) -> Result<QuarantineEntry, QuarantineError> {
///         todo!()
///     }
///
///     async fn list(&self) -> Result<Vec<QuarantineEntry>, QuarantineError> {
///         todo!()
///     }
///
///     async fn restore(&self, stored_filename: &str) -> Result<PathBuf, QuarantineError> {
///         todo!()
///     }
///
///     async fn delete(&self, stored_filename: &str) -> Result<(), QuarantineError> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait QuarantineStore: Send + Sync + Debug {
    /// Moves an infected file into quarantine and records where it came from.
    ///
    /// # Arguments
    ///
    /// * `path` - The infected file, as reported by the scanner
    ///
    /// # Returns
    ///
    /// The new entry, including its sidecar record.
    async fn quarantine(&self, path: &Path) -> Result<QuarantineEntry, QuarantineError>;

    /// Lists every readable entry.
    ///
    /// Entries with a corrupt or missing sidecar are skipped, not reported as
    /// errors. Order is unspecified.
    async fn list(&self) -> Result<Vec<QuarantineEntry>, QuarantineError>;

    /// Moves a quarantined file back to its original location.
    ///
    /// # Returns
    ///
    /// The path the file was restored to.
    async fn restore(&self, stored_filename: &str) -> Result<PathBuf, QuarantineError>;

    /// Permanently removes a quarantined file and its sidecar.
    async fn delete(&self, stored_filename: &str) -> Result<(), QuarantineError>;

    /// Returns the number of quarantined files.
    async fn count(&self) -> Result<usize, QuarantineError> {
        Ok(self.list().await?.len())
    }
}

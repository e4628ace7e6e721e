//! Filesystem-based quarantine storage implementation.

use crate::audit;
use crate::core::error::{QuarantineError, QuarantineResult};
use crate::quarantine::record::{
    format_timestamp, sidecar_path, QuarantineEntry, QuarantineRecord, SIDECAR_EXTENSION,
};
use crate::quarantine::traits::QuarantineStore;

use async_trait::async_trait;
use chrono::Local;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the quarantine directory under the configuration root.
pub const QUARANTINE_DIR_NAME: &str = "quarantine";

/// Filesystem-based quarantine storage.
///
/// Infected files are moved (not copied) into a single directory and get a
/// JSON sidecar describing where they came from.
///
/// # Directory Structure
///
/// ```text
/// <config-root>/quarantine/
/// ├── 20240309_070501_b.exe         # Quarantined file
/// └── 20240309_070501_b.exe.json    # Sidecar record
/// ```
///
/// The directory is created on the first quarantine, not by [`FilesystemQuarantine::new`].
#[derive(Debug, Clone)]
pub struct FilesystemQuarantine {
    /// The quarantine directory itself.
    dir: PathBuf,
}

impl FilesystemQuarantine {
    /// Creates a store at `<config_root>/quarantine`.
    pub fn new(config_root: impl AsRef<Path>) -> Self {
        Self::at(config_root.as_ref().join(QUARANTINE_DIR_NAME))
    }

    /// Creates a store using `dir` directly as the quarantine directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the quarantine directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Picks a destination that collides with neither a stored file nor a sidecar.
    async fn reserve_destination(
        &self,
        time: &str,
        file_name: &str,
    ) -> QuarantineResult<(String, PathBuf)> {
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{time}_{file_name}")
            } else {
                format!("{time}_{attempt}_{file_name}")
            };
            let candidate = self.dir.join(&name);
            if !tokio::fs::try_exists(&candidate).await?
                && !tokio::fs::try_exists(sidecar_path(&candidate)).await?
            {
                return Ok((name, candidate));
            }
            attempt += 1;
        }
    }

    /// Loads the entry described by `sidecar`.
    async fn load_entry(&self, sidecar: &Path) -> QuarantineResult<QuarantineEntry> {
        let malformed = |reason: String| QuarantineError::MalformedRecord {
            path: sidecar.to_path_buf(),
            reason,
        };

        let stored_name = sidecar
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(&format!(".{SIDECAR_EXTENSION}")))
            .ok_or_else(|| malformed("not a sidecar name".into()))?
            .to_string();

        let content = tokio::fs::read(sidecar)
            .await
            .map_err(|e| malformed(e.to_string()))?;
        let mut record: QuarantineRecord =
            serde_json::from_slice(&content).map_err(|e| malformed(e.to_string()))?;

        if record.original.is_empty() || record.time.is_empty() {
            return Err(malformed("empty original path or timestamp".into()));
        }
        if record.stored_filename.is_empty() {
            record.stored_filename = stored_name;
        } else if record.stored_filename != stored_name {
            return Err(malformed(format!(
                "stored_filename '{}' does not match sidecar name",
                record.stored_filename
            )));
        }

        let stored_path = self.dir.join(&record.stored_filename);
        if !tokio::fs::try_exists(&stored_path).await? {
            return Err(malformed("quarantined file is missing".into()));
        }

        Ok(QuarantineEntry {
            record,
            stored_path,
            sidecar_path: sidecar.to_path_buf(),
        })
    }

    /// Resolves a stored file name to its entry.
    async fn find(&self, stored_filename: &str) -> QuarantineResult<QuarantineEntry> {
        let is_plain_name = Path::new(stored_filename).file_name()
            == Some(std::ffi::OsStr::new(stored_filename))
            && !stored_filename.starts_with('.');
        if !is_plain_name {
            return Err(QuarantineError::invalid_path(
                stored_filename,
                "not a quarantine entry name",
            ));
        }

        let sidecar = sidecar_path(&self.dir.join(stored_filename));
        if !tokio::fs::try_exists(&sidecar).await? {
            return Err(QuarantineError::NotFound {
                stored_filename: stored_filename.to_string(),
            });
        }
        self.load_entry(&sidecar).await
    }
}

#[async_trait]
impl QuarantineStore for FilesystemQuarantine {
    async fn quarantine(&self, path: &Path) -> Result<QuarantineEntry, QuarantineError> {
        let original = path
            .to_str()
            .ok_or_else(|| QuarantineError::invalid_path(path, "path is not valid UTF-8"))?
            .to_string();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QuarantineError::invalid_path(path, "path has no file name"))?;

        let metadata = tokio::fs::symlink_metadata(path).await.map_err(|e| {
            QuarantineError::store_failed(format!("cannot access {}: {}", path.display(), e))
        })?;
        if metadata.is_dir() {
            return Err(QuarantineError::invalid_path(path, "is a directory"));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            QuarantineError::store_failed(format!("failed to create quarantine directory: {e}"))
        })?;

        let time = format_timestamp(Local::now());
        let (stored_filename, stored_path) = self.reserve_destination(&time, file_name).await?;

        move_file(path, &stored_path).await.map_err(|e| {
            QuarantineError::store_failed(format!("failed to move {}: {}", path.display(), e))
        })?;

        let mut record = QuarantineRecord::new(original, time, stored_filename);
        match hash_file(stored_path.clone()).await {
            Ok(digest) => record = record.with_blake3(digest),
            Err(e) => tracing::warn!(
                path = %stored_path.display(),
                error = %e,
                "Could not hash quarantined file"
            ),
        }

        let sidecar = sidecar_path(&stored_path);
        if let Err(e) = write_sidecar(&sidecar, &record).await {
            // Without a sidecar the file could never be restored, so put it back.
            if let Err(rollback) = move_file(&stored_path, path).await {
                tracing::error!(
                    stored = %stored_path.display(),
                    original = %path.display(),
                    error = %rollback,
                    "Failed to roll back quarantine move"
                );
            }
            return Err(e);
        }

        tracing::info!(
            original = %record.original,
            stored = %record.stored_filename,
            "File quarantined"
        );
        audit::emit_quarantine_event(&record, "quarantine");

        Ok(QuarantineEntry {
            record,
            stored_path,
            sidecar_path: sidecar,
        })
    }

    async fn list(&self) -> Result<Vec<QuarantineEntry>, QuarantineError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "Skipping non UTF-8 quarantine entry");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let has_sidecar = tokio::fs::try_exists(sidecar_path(&path)).await?;
            let looks_like_sidecar = Path::new(name)
                .extension()
                .is_some_and(|ext| ext == SIDECAR_EXTENSION);

            if has_sidecar {
                // A quarantined file; its sidecar is handled on its own.
                continue;
            }
            if !looks_like_sidecar {
                tracing::warn!(path = %path.display(), "Quarantined file has no sidecar record");
                continue;
            }

            match self.load_entry(&path).await {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, "Skipping quarantine entry"),
            }
        }

        tracing::debug!(count = entries.len(), "Listed quarantine");
        Ok(entries)
    }

    async fn restore(&self, stored_filename: &str) -> Result<PathBuf, QuarantineError> {
        let entry = self.find(stored_filename).await?;

        if let Some(expected) = &entry.record.blake3 {
            let actual = hash_file(entry.stored_path.clone()).await?;
            if &actual != expected {
                return Err(QuarantineError::IntegrityCheckFailed {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let target = entry.record.original_path().to_path_buf();
        if tokio::fs::try_exists(&target).await? {
            return Err(QuarantineError::RestoreTargetExists { path: target });
        }
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        move_file(&entry.stored_path, &target).await?;
        tokio::fs::remove_file(&entry.sidecar_path).await?;

        tracing::info!(
            original = %entry.record.original,
            stored = %entry.record.stored_filename,
            "File restored from quarantine"
        );
        audit::emit_quarantine_event(&entry.record, "restore");

        Ok(target)
    }

    async fn delete(&self, stored_filename: &str) -> Result<(), QuarantineError> {
        let entry = self.find(stored_filename).await?;

        tokio::fs::remove_file(&entry.stored_path).await?;
        tokio::fs::remove_file(&entry.sidecar_path).await?;

        tracing::info!(
            original = %entry.record.original,
            stored = %entry.record.stored_filename,
            "Quarantined file deleted"
        );
        audit::emit_quarantine_event(&entry.record, "delete");

        Ok(())
    }
}

/// Returns a hidden sibling of `path` with the given suffix.
fn hidden_sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(suffix);
    path.with_file_name(name)
}

/// Moves a file, falling back to copy + remove across filesystems.
///
/// The destination name only ever appears fully written: the cross-device
/// copy goes to a hidden partial file first and is renamed into place.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "Rename crosses devices, copying instead"
            );
            copy_across_devices(from, to).await
        }
        Err(e) => Err(e),
    }
}

async fn copy_across_devices(from: &Path, to: &Path) -> std::io::Result<()> {
    let partial = hidden_sibling(to, ".partial");

    let copied = async {
        tokio::fs::copy(from, &partial).await?;
        tokio::fs::File::open(&partial).await?.sync_all().await?;
        tokio::fs::rename(&partial, to).await
    }
    .await;
    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::remove_file(from).await {
        let _ = tokio::fs::remove_file(to).await;
        return Err(e);
    }
    Ok(())
}

/// Writes a sidecar through a temporary file so readers never see half of it.
async fn write_sidecar(path: &Path, record: &QuarantineRecord) -> QuarantineResult<()> {
    let content = serde_json::to_vec_pretty(record).map_err(|e| QuarantineError::MalformedRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let tmp = hidden_sibling(path, ".tmp");
    let written = async {
        tokio::fs::write(&tmp, &content).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(QuarantineError::store_failed(format!(
            "failed to write sidecar {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

/// Computes the BLAKE3 digest of a file off the async runtime.
async fn hash_file(path: PathBuf) -> std::io::Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&path)?;
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(hasher.finalize().to_hex().to_string())
    })
    .await
    .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn infected_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_quarantine_creates_directory_lazily() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());
        assert!(!store.dir().exists());

        let file = infected_file(victims.path(), "b.exe", b"X5O!P%@AP");
        let entry = store.quarantine(&file).await.unwrap();

        assert!(store.dir().is_dir());
        assert!(!file.exists());
        assert!(entry.stored_path.exists());
        assert!(entry.sidecar_path.exists());
        assert!(entry.record.stored_filename.ends_with("_b.exe"));
        assert_eq!(entry.record.time.len(), "YYYYMMDD_HHMMSS".len());
        assert_eq!(
            std::fs::read(&entry.stored_path).unwrap(),
            b"X5O!P%@AP".to_vec()
        );
    }

    #[tokio::test]
    async fn test_sidecar_round_trips_original_path() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let file = infected_file(victims.path(), "weird name ü.doc", b"payload");
        let original = file.to_str().unwrap().to_string();
        let entry = store.quarantine(&file).await.unwrap();

        let raw = std::fs::read_to_string(&entry.sidecar_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["original"].as_str(), Some(original.as_str()));
        assert_eq!(value["time"].as_str(), Some(entry.record.time.as_str()));

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record.original, original);
        assert_eq!(listed[0].record.stored_filename, entry.record.stored_filename);
    }

    #[tokio::test]
    async fn test_same_name_same_second_does_not_overwrite() {
        let root = TempDir::new().unwrap();
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let first = store
            .quarantine(&infected_file(a.path(), "dup.bin", b"first"))
            .await
            .unwrap();
        let second = store
            .quarantine(&infected_file(b.path(), "dup.bin", b"second"))
            .await
            .unwrap();

        assert_ne!(first.record.stored_filename, second.record.stored_filename);
        assert_eq!(std::fs::read(&first.stored_path).unwrap(), b"first".to_vec());
        assert_eq!(std::fs::read(&second.stored_path).unwrap(), b"second".to_vec());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_quarantine_missing_file_fails_without_side_effects() {
        let root = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let result = store.quarantine(Path::new("/nonexistent/evil.exe")).await;
        assert!(matches!(result, Err(QuarantineError::StoreFailed { .. })));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let root = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_and_orphaned_entries() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        store
            .quarantine(&infected_file(victims.path(), "good.exe", b"good"))
            .await
            .unwrap();

        let dir = store.dir();
        std::fs::write(dir.join("20240101_000000_bad.exe"), b"bad").unwrap();
        std::fs::write(dir.join("20240101_000000_bad.exe.json"), b"{not json").unwrap();
        std::fs::write(dir.join("20240101_000000_orphan.exe"), b"orphan").unwrap();
        std::fs::write(
            dir.join("20240101_000000_gone.exe.json"),
            br#"{"original": "/tmp/gone.exe", "time": "20240101_000000"}"#,
        )
        .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].record.original.ends_with("good.exe"));
    }

    #[tokio::test]
    async fn test_list_accepts_legacy_sidecar() {
        let root = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());
        let dir = store.dir();
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("20240101_000000_old.exe"), b"old").unwrap();
        std::fs::write(
            dir.join("20240101_000000_old.exe.json"),
            br#"{"original": "/home/u/old.exe", "time": "20240101_000000"}"#,
        )
        .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record.stored_filename, "20240101_000000_old.exe");
        assert_eq!(listed[0].display_pair(), ("20240101_000000", "/home/u/old.exe"));
    }

    #[tokio::test]
    async fn test_json_payload_is_not_mistaken_for_sidecar() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        store
            .quarantine(&infected_file(victims.path(), "config.json", b"{}"))
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].record.original.ends_with("config.json"));
    }

    #[tokio::test]
    async fn test_restore_moves_file_back() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let file = infected_file(victims.path(), "fp.pdf", b"false positive");
        let entry = store.quarantine(&file).await.unwrap();

        let restored = store.restore(&entry.record.stored_filename).await.unwrap();
        assert_eq!(restored, file);
        assert_eq!(std::fs::read(&file).unwrap(), b"false positive".to_vec());
        assert!(!entry.stored_path.exists());
        assert!(!entry.sidecar_path.exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_restore_refuses_to_overwrite() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let file = infected_file(victims.path(), "a.exe", b"old");
        let entry = store.quarantine(&file).await.unwrap();
        std::fs::write(&file, b"new").unwrap();

        let result = store.restore(&entry.record.stored_filename).await;
        assert!(matches!(result, Err(QuarantineError::RestoreTargetExists { .. })));
        assert!(entry.stored_path.exists());
        assert_eq!(std::fs::read(&file).unwrap(), b"new".to_vec());
    }

    #[tokio::test]
    async fn test_restore_detects_tampering() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let file = infected_file(victims.path(), "a.exe", b"original");
        let entry = store.quarantine(&file).await.unwrap();
        std::fs::write(&entry.stored_path, b"tampered").unwrap();

        let result = store.restore(&entry.record.stored_filename).await;
        assert!(matches!(
            result,
            Err(QuarantineError::IntegrityCheckFailed { .. })
        ));
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_sidecar() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let entry = store
            .quarantine(&infected_file(victims.path(), "x.exe", b"x"))
            .await
            .unwrap();
        store.delete(&entry.record.stored_filename).await.unwrap();

        assert!(!entry.stored_path.exists());
        assert!(!entry.sidecar_path.exists());
        assert!(matches!(
            store.delete(&entry.record.stored_filename).await,
            Err(QuarantineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_entry_names_cannot_escape_directory() {
        let root = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());

        let result = store.delete("../language.json").await;
        assert!(matches!(result, Err(QuarantineError::InvalidPath { .. })));
    }

    #[tokio::test]
    async fn test_failed_sidecar_write_puts_file_back() {
        let root = TempDir::new().unwrap();
        let victims = TempDir::new().unwrap();
        let store = FilesystemQuarantine::new(root.path());
        std::fs::create_dir_all(store.dir()).unwrap();

        // Occupy the sidecar's temporary name for the next few seconds.
        let now = Local::now();
        for offset in 0..3 {
            let time = format_timestamp(now + chrono::Duration::seconds(offset));
            let sidecar = sidecar_path(&store.dir().join(format!("{time}_b.exe")));
            std::fs::create_dir(hidden_sibling(&sidecar, ".tmp")).unwrap();
        }

        let file = infected_file(victims.path(), "b.exe", b"payload");
        let err = store.quarantine(&file).await.unwrap_err();

        assert!(matches!(err, QuarantineError::StoreFailed { .. }));
        assert_eq!(std::fs::read(&file).unwrap(), b"payload".to_vec());
        let visible: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| !n.to_string_lossy().starts_with('.'))
            .collect();
        assert!(visible.is_empty(), "left behind: {visible:?}");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_fallback_moves_content() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let from = infected_file(src.path(), "b.exe", b"payload");
        let to = dst.path().join("20240309_070501_b.exe");

        copy_across_devices(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"payload".to_vec());
        assert!(!hidden_sibling(&to, ".partial").exists());
    }
}

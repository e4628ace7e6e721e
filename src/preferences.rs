//! Persisted user preferences.
//!
//! Two small JSON files live in the configuration root:
//! `language.json` (`{"language": "pt"}`) and `first_run.json`
//! (`{"shown": true}`).

use crate::core::PreferencesResult;
use crate::i18n::Locale;

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File holding the language preference.
pub const LANGUAGE_FILE: &str = "language.json";

/// Marker file written once the first-run notice was shown.
pub const FIRST_RUN_FILE: &str = "first_run.json";

#[derive(Debug, Serialize, Deserialize)]
struct LanguageFile {
    #[serde(default)]
    language: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FirstRunFile {
    shown: bool,
}

/// Reads and writes preferences under a configuration root.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    root: PathBuf,
}

impl PreferenceStore {
    /// Creates a store rooted at `root` (normally `$HOME/.clamav-gui`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configuration root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the saved language, falling back to English.
    ///
    /// A missing file is silent. A malformed file or an unknown code is
    /// logged and ignored.
    pub async fn load_language(&self) -> Locale {
        match self.read_language().await {
            Ok(Some(locale)) => locale,
            Ok(None) => Locale::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring language preference");
                Locale::default()
            }
        }
    }

    /// Reads the saved language. `Ok(None)` when nothing usable is stored.
    pub async fn read_language(&self) -> PreferencesResult<Option<Locale>> {
        let path = self.root.join(LANGUAGE_FILE);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: LanguageFile = serde_json::from_slice(&content)?;
        let locale = Locale::from_code(&file.language);
        if locale.is_none() {
            tracing::warn!(code = %file.language, "Unknown language code in preferences");
        }
        Ok(locale)
    }

    /// Saves the language preference.
    pub async fn save_language(&self, locale: Locale) -> PreferencesResult<()> {
        let file = LanguageFile {
            language: locale.code().to_string(),
        };
        self.write(LANGUAGE_FILE, &serde_json::to_vec(&file)?)
            .await?;
        tracing::debug!(language = locale.code(), "Saved language preference");
        Ok(())
    }

    /// Returns `true` until the first-run notice has been marked as shown.
    pub async fn first_run_notice_pending(&self) -> bool {
        !tokio::fs::try_exists(self.root.join(FIRST_RUN_FILE))
            .await
            .unwrap_or(false)
    }

    /// Records that the first-run notice was shown.
    pub async fn mark_first_run_notice_shown(&self) -> PreferencesResult<()> {
        let content = serde_json::to_vec(&FirstRunFile { shown: true })?;
        self.write(FIRST_RUN_FILE, &content).await
    }

    async fn write(&self, name: &str, content: &[u8]) -> PreferencesResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        let mut tmp_name = OsString::from(".");
        tmp_name.push(name);
        tmp_name.push(".tmp");
        let tmp = self.root.join(tmp_name);

        if let Err(e) = tokio::fs::write(&tmp, content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

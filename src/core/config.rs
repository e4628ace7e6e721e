//! Engine configuration.

use std::path::{Path, PathBuf};

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".clamav-gui";

/// Release feed of the project. Shown to the user, never queried.
pub const RELEASES_URL: &str = "https://api.github.com/repos/AjcpPT/clamav-gui-pro/releases/latest";

/// External programs used by the runners.
///
/// # Example
///
/// ```rust
/// use clamkeeper::core::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_scanner("/usr/local/bin/clamscan")
///     .with_updater("/usr/local/bin/freshclam");
/// assert!(config.install_commands.len() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scanner binary (`clamscan`).
    pub scanner_program: PathBuf,

    /// Signature updater binary (`freshclam`).
    pub updater_program: PathBuf,

    /// Commands run, in order, to install the engine when it is missing.
    pub install_commands: Vec<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scanner_program: PathBuf::from("clamscan"),
            updater_program: PathBuf::from("freshclam"),
            install_commands: vec![
                vec!["pkexec".into(), "apt-get".into(), "update".into()],
                vec![
                    "pkexec".into(),
                    "apt-get".into(),
                    "install".into(),
                    "-y".into(),
                    "clamav".into(),
                    "clamav-daemon".into(),
                ],
            ],
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scanner binary.
    pub fn with_scanner(mut self, program: impl Into<PathBuf>) -> Self {
        self.scanner_program = program.into();
        self
    }

    /// Sets the updater binary.
    pub fn with_updater(mut self, program: impl Into<PathBuf>) -> Self {
        self.updater_program = program.into();
        self
    }

    /// Replaces the install commands.
    pub fn with_install_commands(mut self, commands: Vec<Vec<String>>) -> Self {
        self.install_commands = commands;
        self
    }
}

/// Returns the default configuration root, `$HOME/.clamav-gui`.
pub fn default_config_root(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME)
}

//! Startup dependency check.
//!
//! Before any job runs the scanner is probed with `--version`. When it is
//! missing and installation is allowed, the configured install commands run
//! once and the caller is asked to restart the process. The restarted
//! process carries [`INSTALL_ATTEMPTED_ENV`] so it never installs again.

use crate::core::{EngineConfig, EventSender, RunnerError, RunnerResult};
use crate::i18n::{Catalog, Locale};

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Environment variable set on the restarted process after an install.
pub const INSTALL_ATTEMPTED_ENV: &str = "CLAMKEEPER_INSTALL_ATTEMPTED";

/// Whether [`ensure_engine`] may install a missing scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPolicy {
    /// Run the install commands when the probe fails.
    Allowed,

    /// Never install (`--no-install`).
    Disabled,

    /// This process was restarted after an install; do not try again.
    AlreadyAttempted,
}

impl InstallPolicy {
    /// Resolves the policy from the user's choice and the restart marker.
    pub fn resolve(allow_install: bool, marker: Option<&OsStr>) -> Self {
        if !allow_install {
            Self::Disabled
        } else if marker.is_some_and(|value| !value.is_empty()) {
            Self::AlreadyAttempted
        } else {
            Self::Allowed
        }
    }

    /// Like [`InstallPolicy::resolve`], reading the marker from the environment.
    pub fn from_env(allow_install: bool) -> Self {
        Self::resolve(
            allow_install,
            std::env::var_os(INSTALL_ATTEMPTED_ENV).as_deref(),
        )
    }
}

/// Outcome of [`ensure_engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// The scanner answered; holds the first line of its version output.
    Ready {
        /// Reported engine version.
        version: String,
    },

    /// The engine was just installed; the process should re-execute itself.
    Restart,
}

/// Runs `<program> --version` and returns the first line it printed.
pub async fn probe(program: &Path) -> RunnerResult<String> {
    let name = program.display().to_string();
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| RunnerError::missing_dependency(&name, e.to_string()))?;

    if !output.status.success() {
        return Err(RunnerError::missing_dependency(
            &name,
            format!("version probe exited with {}", output.status),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
}

/// Makes sure the scanner is available.
///
/// Status lines for the user are sent on `events`. Unless `policy` is
/// [`InstallPolicy::Allowed`] a missing scanner is reported as an error
/// straight away.
pub async fn ensure_engine(
    config: &EngineConfig,
    policy: InstallPolicy,
    events: &EventSender,
    locale: Locale,
) -> RunnerResult<Bootstrap> {
    let err = match probe(&config.scanner_program).await {
        Ok(version) => {
            tracing::debug!(version = %version, "Scanner available");
            return Ok(Bootstrap::Ready { version });
        }
        Err(e) => e,
    };

    match policy {
        InstallPolicy::Allowed => {}
        InstallPolicy::Disabled => return Err(err),
        InstallPolicy::AlreadyAttempted => {
            tracing::warn!(error = %err, "Scanner still missing after install");
            return Err(RunnerError::missing_dependency(
                config.scanner_program.display().to_string(),
                format!("still unavailable after installation ({err})"),
            ));
        }
    }
    tracing::warn!(error = %err, "Scanner missing, installing");

    events.progress(Catalog::lookup(locale, "installing_engine"));
    if let Err(e) = install_engine(config).await {
        events.progress(Catalog::lookup(locale, "engine_install_failed"));
        return Err(e);
    }
    events.progress(Catalog::lookup(locale, "engine_installed"));
    events.progress(Catalog::lookup(locale, "restarting"));

    Ok(Bootstrap::Restart)
}

/// Runs every install command in order, stopping at the first failure.
pub async fn install_engine(config: &EngineConfig) -> RunnerResult<()> {
    let scanner = config.scanner_program.display().to_string();
    if config.install_commands.is_empty() {
        return Err(RunnerError::missing_dependency(
            scanner,
            "no install command configured",
        ));
    }

    for argv in &config.install_commands {
        let Some((program, args)) = argv.split_first() else {
            return Err(RunnerError::configuration("empty install command"));
        };

        tracing::info!(command = %argv.join(" "), "Running install command");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| RunnerError::launch_failed(program, e))?;

        if !status.success() {
            return Err(RunnerError::missing_dependency(
                &scanner,
                format!("'{}' exited with {}", argv.join(" "), status),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_present_scanner_is_ready() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let program = dir.path().join("clamscan");
        std::fs::write(&program, "#!/bin/sh\necho 'ClamAV 1.0.3/27200'\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (events, _rx) = EventSender::channel();
        let outcome = ensure_engine(
            &EngineConfig::default().with_scanner(&program),
            InstallPolicy::Allowed,
            &events,
            Locale::En,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            Bootstrap::Ready {
                version: "ClamAV 1.0.3/27200".into()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_scanner_without_install() {
        let (events, _rx) = EventSender::channel();
        let result = ensure_engine(
            &EngineConfig::default().with_scanner("/nonexistent/clamscan"),
            InstallPolicy::Disabled,
            &events,
            Locale::En,
        )
        .await;
        assert!(matches!(result, Err(RunnerError::MissingDependency { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_install_requests_restart() {
        let config = EngineConfig::default()
            .with_scanner("/nonexistent/clamscan")
            .with_install_commands(vec![shell("exit 0"), shell("exit 0")]);
        let (events, mut rx) = EventSender::channel();

        let outcome = ensure_engine(&config, InstallPolicy::Allowed, &events, Locale::En)
            .await
            .unwrap();
        assert_eq!(outcome, Bootstrap::Restart);

        let mut lines = Vec::new();
        while let Ok(crate::core::RunnerEvent::Progress(line)) = rx.try_recv() {
            lines.push(line);
        }
        assert_eq!(
            lines,
            vec!["Installing ClamAV...", "ClamAV installed!", "Restarting..."]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_install_stops_at_first_command() {
        let marker = tempfile::TempDir::new().unwrap();
        let touched = marker.path().join("second-ran");
        let config = EngineConfig::default()
            .with_scanner("/nonexistent/clamscan")
            .with_install_commands(vec![
                shell("exit 100"),
                shell(&format!("touch '{}'", touched.display())),
            ]);
        let (events, _rx) = EventSender::channel();

        let result = ensure_engine(&config, InstallPolicy::Allowed, &events, Locale::En).await;
        assert!(matches!(result, Err(RunnerError::MissingDependency { .. })));
        assert!(!touched.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restarted_process_does_not_install_again() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("installs.log");
        let config = EngineConfig::default()
            .with_scanner("/opt/custom/clamscan")
            .with_install_commands(vec![shell(&format!("echo run >> '{}'", log.display()))]);
        let (events, _rx) = EventSender::channel();

        let first = ensure_engine(&config, InstallPolicy::Allowed, &events, Locale::En).await;
        assert_eq!(first.unwrap(), Bootstrap::Restart);

        let policy = InstallPolicy::resolve(true, Some(OsStr::new("1")));
        assert_eq!(policy, InstallPolicy::AlreadyAttempted);
        for _ in 0..2 {
            let again = ensure_engine(&config, policy, &events, Locale::En).await;
            match again {
                Err(RunnerError::MissingDependency { reason, .. }) => {
                    assert!(reason.contains("after installation"))
                }
                other => panic!("expected missing dependency, got {other:?}"),
            }
        }

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "run\n");
    }

    #[test]
    fn test_install_policy_resolution() {
        assert_eq!(InstallPolicy::resolve(true, None), InstallPolicy::Allowed);
        assert_eq!(
            InstallPolicy::resolve(true, Some(OsStr::new(""))),
            InstallPolicy::Allowed
        );
        assert_eq!(
            InstallPolicy::resolve(false, Some(OsStr::new("1"))),
            InstallPolicy::Disabled
        );
    }

    #[tokio::test]
    async fn test_empty_install_command_is_configuration_error() {
        let config = EngineConfig::default().with_install_commands(vec![Vec::new()]);
        assert!(matches!(
            install_engine(&config).await,
            Err(RunnerError::Configuration { .. })
        ));
    }
}

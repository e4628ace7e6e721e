//! Update runner: wraps the signature updater.

use crate::audit;
use crate::core::{Completion, EngineConfig, EventSender, RunnerError, RunnerResult};
use crate::i18n::{Catalog, Locale};

use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs the signature updater once.
///
/// The updater exits non-zero when the databases are already current, so
/// any exit status counts as success. Only a launch failure is an error.
#[derive(Debug, Clone)]
pub struct UpdateRunner {
    config: EngineConfig,
    locale: Locale,
}

impl UpdateRunner {
    /// Creates a runner for the configured updater.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            locale: Locale::default(),
        }
    }

    /// Sets the language of the status lines.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Builds the updater command line.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.config.updater_program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Runs one update to completion and returns its outcome.
    pub async fn run(&self, events: &EventSender, cancel: &CancellationToken) -> Completion {
        events.progress(Catalog::lookup(self.locale, "updating"));

        let output = match self.execute(cancel).await {
            Ok(Some(output)) => output,
            Ok(None) => {
                tracing::info!("Update cancelled, updater stopped");
                return Completion::Cancelled;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Update failed");
                let completion = Completion::failed(e);
                audit::emit_update_completed(None, &completion);
                return completion;
            }
        };

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let line = line.trim();
            if !line.is_empty() {
                events.progress(line);
            }
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Updater stderr");
        }

        let key = if output.status.success() {
            "updated"
        } else {
            "already_current"
        };
        events.progress(Catalog::lookup(self.locale, key));

        let completion = Completion::UpdateComplete;
        audit::emit_update_completed(output.status.code(), &completion);
        completion
    }

    /// Spawns the updater and waits for it. `None` means cancelled; the
    /// child is killed when its future is dropped.
    async fn execute(&self, cancel: &CancellationToken) -> RunnerResult<Option<Output>> {
        let child = self.command().spawn().map_err(|e| {
            RunnerError::launch_failed(self.config.updater_program.display().to_string(), e)
        })?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(None),
            output = child.wait_with_output() => {
                let output = output?;
                tracing::debug!(status = %output.status, "Updater exited");
                Ok(Some(output))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RunnerEvent;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn progress_lines(rx: &mut UnboundedReceiver<RunnerEvent>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let RunnerEvent::Progress(line) = event {
                lines.push(line);
            }
        }
        lines
    }

    #[cfg(unix)]
    fn fake_updater(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("freshclam");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_zero_is_updated() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_updater(dir.path(), "echo 'daily.cvd updated'\nexit 0");
        let runner = UpdateRunner::new(EngineConfig::default().with_updater(program));
        let (events, mut rx) = EventSender::channel();

        let completion = runner.run(&events, &CancellationToken::new()).await;

        assert_eq!(completion, Completion::UpdateComplete);
        assert!(completion.is_success());
        assert_eq!(
            progress_lines(&mut rx),
            vec!["Updating databases...", "daily.cvd updated", "Updated!"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_already_current() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_updater(dir.path(), "exit 1");
        let runner = UpdateRunner::new(EngineConfig::default().with_updater(program))
            .with_locale(Locale::Pt);
        let (events, mut rx) = EventSender::channel();

        let completion = runner.run(&events, &CancellationToken::new()).await;

        assert_eq!(completion, Completion::UpdateComplete);
        assert_eq!(
            progress_lines(&mut rx).last().map(String::as_str),
            Some("Já está atualizado")
        );
    }

    #[tokio::test]
    async fn test_missing_updater_fails() {
        let runner = UpdateRunner::new(
            EngineConfig::default().with_updater("/nonexistent/freshclam"),
        );
        let (events, _rx) = EventSender::channel();

        let completion = runner.run(&events, &CancellationToken::new()).await;

        assert!(!completion.is_success());
        assert!(matches!(completion, Completion::Failed { error } if error.contains("freshclam")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_stops_updater() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_updater(dir.path(), "sleep 30");
        let runner = UpdateRunner::new(EngineConfig::default().with_updater(program));
        let (events, _rx) = EventSender::channel();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let completion = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            runner.run(&events, &cancel),
        )
        .await
        .unwrap();
        assert_eq!(completion, Completion::Cancelled);
    }
}

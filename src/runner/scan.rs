//! Scan runner: drives the external scanner and quarantines what it reports.

use crate::audit::{self, ScanAuditEvent};
use crate::core::{
    Completion, EngineConfig, EventSender, RunnerError, RunnerEvent, RunnerResult, ScanRequest,
};
use crate::i18n::{Catalog, Locale};
use crate::quarantine::QuarantineStore;
use crate::runner::output::{classify, infected_path, ScanLine, ScanTally};

use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs the scanner over a path and streams its output as events.
///
/// # Example
///
/// ```rust,ignore
/// use clamkeeper::core::{EngineConfig, EventSender, ScanRequest};
/// use clamkeeper::quarantine::FilesystemQuarantine;
/// use clamkeeper::runner::ScanRunner;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// let store = Arc::new(FilesystemQuarantine::new("/home/ana/.clamav-gui"));
/// let runner = ScanRunner::new(EngineConfig::default(), store);
/// let (events, mut rx) = EventSender::channel();
/// let completion = runner
///     .run(&ScanRequest::folder("/home/ana/Downloads"), &events, &CancellationToken::new())
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct ScanRunner {
    config: EngineConfig,
    store: Arc<dyn QuarantineStore>,
    locale: Locale,
}

impl ScanRunner {
    /// Creates a runner that quarantines into `store`.
    pub fn new(config: EngineConfig, store: Arc<dyn QuarantineStore>) -> Self {
        Self {
            config,
            store,
            locale: Locale::default(),
        }
    }

    /// Sets the language of the warning lines the runner writes itself.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Returns the quarantine store.
    pub fn store(&self) -> &Arc<dyn QuarantineStore> {
        &self.store
    }

    /// Builds the scanner command line: `<scanner> [-r] -i <path>`.
    pub fn command(&self, request: &ScanRequest) -> Command {
        let mut command = Command::new(&self.config.scanner_program);
        if request.recursive {
            command.arg("-r");
        }
        command
            .arg("-i")
            .arg(&request.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Runs one scan to completion.
    ///
    /// Emits `Progress`, `Infected`, `Quarantined` and finally `Stats` events
    /// on `events`. The returned completion is not sent; the caller delivers
    /// it as the terminal event. Errors never escape: they become
    /// [`Completion::Failed`].
    pub async fn run(
        &self,
        request: &ScanRequest,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Completion {
        audit::emit_scan_started(request);

        match self.execute(request, events, cancel).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(error = %e, path = %request.path.display(), "Scan failed");
                Completion::failed(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &ScanRequest,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> RunnerResult<Completion> {
        let program = self.config.scanner_program.display().to_string();
        let mut child = self
            .command(request)
            .spawn()
            .map_err(|e| RunnerError::launch_failed(&program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::internal("scanner stdout was not captured"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_stderr(stderr, program.clone()));
        }

        let Some(tally) = self
            .process_output(BufReader::new(stdout), request, events, cancel)
            .await?
        else {
            tracing::info!(path = %request.path.display(), "Scan cancelled, stopping scanner");
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to stop scanner");
            }
            return Ok(Completion::Cancelled);
        };

        let status = child.wait().await?;
        tracing::debug!(status = %status, "Scanner exited");

        let result = tally.result();
        let completion = tally.completion(request.auto_quarantine);
        events.send(RunnerEvent::Stats(result));

        let target = request.path.display().to_string();
        audit::emit_scan_completed(&ScanAuditEvent::new(&target, &result, &completion));

        Ok(completion)
    }

    /// Consumes scanner output line by line as it arrives.
    ///
    /// Returns `None` if `cancel` fired before the output ended.
    pub async fn process_output<R>(
        &self,
        mut reader: R,
        request: &ScanRequest,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> RunnerResult<Option<ScanTally>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut tally = ScanTally::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(None),
                read = reader.read_until(b'\n', &mut buf) => read?,
            };
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            self.handle_line(line.trim(), &buf, request, events, &mut tally)
                .await;
        }

        Ok(Some(tally))
    }

    async fn handle_line(
        &self,
        line: &str,
        raw: &[u8],
        request: &ScanRequest,
        events: &EventSender,
        tally: &mut ScanTally,
    ) {
        if line.is_empty() {
            return;
        }
        events.progress(line);

        match classify(line) {
            ScanLine::ScannedTotal(Some(count)) => tally.scanned = count,
            ScanLine::ScannedTotal(None) => {
                // Ignored on purpose: the previous total stays.
                tracing::debug!(line, "Unparseable scanned-files count");
            }
            ScanLine::Infected(reported) => {
                let path = infected_path(raw, reported);
                tracing::warn!(path = %path.display(), "Infected file reported");
                tally.infected.push(path.clone());
                events.send(RunnerEvent::Infected(path.clone()));

                if request.auto_quarantine {
                    match self.store.quarantine(&path).await {
                        Ok(entry) => {
                            tally.quarantined += 1;
                            events.send(RunnerEvent::Quarantined(entry));
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Quarantine failed");
                            events.progress(Catalog::format(
                                self.locale,
                                "quarantine_failed",
                                &[("error", e.to_string())],
                            ));
                        }
                    }
                }
            }
            ScanLine::Progress => {}
        }
    }
}

async fn drain_stderr(stderr: tokio::process::ChildStderr, program: String) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::debug!(program = %program, "{line}"),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(program = %program, error = %e, "Stopped reading stderr");
                break;
            }
        }
    }
}

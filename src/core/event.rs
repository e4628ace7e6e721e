//! Events streamed from a running job to the presentation loop.

use crate::core::types::{Completion, ScanResult};
use crate::quarantine::QuarantineEntry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// The two kinds of background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// A scanner run.
    Scan,
    /// A signature-updater run.
    Update,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// A single event emitted by a runner.
///
/// Events arrive in the order the subprocess produced its output.
/// `Finished` is always the last event of a job.
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    /// A line for the log view.
    Progress(String),

    /// The scanner reported this file as infected.
    Infected(PathBuf),

    /// An infected file was moved to quarantine.
    Quarantined(QuarantineEntry),

    /// Final statistics of a scan.
    Stats(ScanResult),

    /// Terminal event.
    Finished(Completion),
}

impl RunnerEvent {
    /// Returns `true` for the terminal event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Sending half of a job's event stream.
///
/// Delivery is best effort: once the receiver is gone the job keeps running
/// and its events are dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<RunnerEvent>,
}

impl EventSender {
    /// Creates a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunnerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sends an event.
    pub fn send(&self, event: RunnerEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped");
        }
    }

    /// Sends a log line.
    pub fn progress(&self, line: impl Into<String>) {
        self.send(RunnerEvent::Progress(line.into()));
    }
}

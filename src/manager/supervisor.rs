//! Background job supervisor.

use crate::audit;
use crate::core::{
    Completion, EngineConfig, EventSender, JobKind, RunnerError, RunnerEvent, RunnerResult,
    ScanRequest,
};
use crate::i18n::Locale;
use crate::manager::JobHandle;
use crate::quarantine::QuarantineStore;
use crate::runner::{ScanRunner, UpdateRunner};

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

type ActiveJobs = Arc<Mutex<HashSet<JobKind>>>;

/// Starts scans and updates off the caller's task.
///
/// At most one job of each kind runs at a time; a scan and an update may run
/// concurrently. Starting a second job of a running kind fails with
/// [`RunnerError::AlreadyRunning`].
///
/// Jobs are spawned on the current tokio runtime.
///
/// # Example
///
/// ```rust,ignore
/// use clamkeeper::prelude::*;
/// use std::sync::Arc;
///
/// let store = Arc::new(FilesystemQuarantine::new("/home/ana/.clamav-gui"));
/// let supervisor = Supervisor::new(EngineConfig::default(), store);
///
/// let mut job = supervisor.start_scan(ScanRequest::folder("/home/ana/Downloads"))?;
/// while let Some(event) = job.next_event().await {
///     println!("{event:?}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Supervisor {
    scan: Arc<ScanRunner>,
    update: Arc<UpdateRunner>,
    active: ActiveJobs,
}

impl Supervisor {
    /// Creates a supervisor for the given engine and quarantine store.
    pub fn new(config: EngineConfig, store: Arc<dyn QuarantineStore>) -> Self {
        Self {
            scan: Arc::new(ScanRunner::new(config.clone(), store)),
            update: Arc::new(UpdateRunner::new(config)),
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Sets the language of runner-generated lines.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.scan = Arc::new(self.scan.as_ref().clone().with_locale(locale));
        self.update = Arc::new(self.update.as_ref().clone().with_locale(locale));
        self
    }

    /// Returns the quarantine store used by scans.
    pub fn store(&self) -> &Arc<dyn QuarantineStore> {
        self.scan.store()
    }

    /// Returns `true` while a job of `kind` is running.
    pub fn is_running(&self, kind: JobKind) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&kind)
    }

    /// Starts a scan.
    pub fn start_scan(&self, request: ScanRequest) -> RunnerResult<JobHandle> {
        let runner = Arc::clone(&self.scan);
        self.start(JobKind::Scan, move |events, cancel| async move {
            runner.run(&request, &events, &cancel).await
        })
    }

    /// Starts a signature update.
    pub fn start_update(&self) -> RunnerResult<JobHandle> {
        let runner = Arc::clone(&self.update);
        self.start(JobKind::Update, move |events, cancel| async move {
            runner.run(&events, &cancel).await
        })
    }

    fn start<F, Fut>(&self, kind: JobKind, job: F) -> RunnerResult<JobHandle>
    where
        F: FnOnce(EventSender, CancellationToken) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let slot = SlotGuard::acquire(&self.active, kind)
            .ok_or(RunnerError::AlreadyRunning { kind })?;

        let id = Uuid::new_v4();
        let span = tracing::info_span!("job", job_id = %id, kind = %kind);
        span.in_scope(|| audit::emit_job_started(&id.to_string(), kind));

        let (events, rx) = EventSender::channel();
        let cancel = CancellationToken::new();
        let work = job(events.clone(), cancel.clone());

        let task = tokio::spawn(
            async move {
                let completion = work.await;
                tracing::info!(success = completion.is_success(), "Job finished");
                // Free the slot first so a caller reacting to `Finished`
                // can start the next job of this kind.
                drop(slot);
                events.send(RunnerEvent::Finished(completion));
            }
            .instrument(span),
        );

        Ok(JobHandle::new(id, kind, rx, cancel, task))
    }
}

/// Marks a job kind as running until dropped.
#[derive(Debug)]
struct SlotGuard {
    active: ActiveJobs,
    kind: JobKind,
}

impl SlotGuard {
    fn acquire(active: &ActiveJobs, kind: JobKind) -> Option<Self> {
        let inserted = active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(kind);
        inserted.then(|| Self {
            active: Arc::clone(active),
            kind,
        })
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.kind);
    }
}

//! Handle to a running background job.

use crate::core::{Completion, JobKind, RunnerEvent};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A handle to a job started by the [`Supervisor`](super::Supervisor).
///
/// Owns the receiving end of the job's event stream. Dropping the handle does
/// not stop the job; call [`JobHandle::cancel`] for that.
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    kind: JobKind,
    events: mpsc::UnboundedReceiver<RunnerEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    finished: Option<Completion>,
}

impl JobHandle {
    pub(crate) fn new(
        id: Uuid,
        kind: JobKind,
        events: mpsc::UnboundedReceiver<RunnerEvent>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            kind,
            events,
            cancel,
            task,
            finished: None,
        }
    }

    /// Unique identifier of this job.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Kind of job.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Asks the job to stop. The job still ends with a `Finished` event.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a token that cancels this job when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the completion, once the terminal event was received.
    pub fn completion(&self) -> Option<&Completion> {
        self.finished.as_ref()
    }

    /// Receives the next event. Returns `None` after the terminal event.
    pub async fn next_event(&mut self) -> Option<RunnerEvent> {
        if self.finished.is_some() {
            return None;
        }

        let event = self.events.recv().await?;
        if let RunnerEvent::Finished(completion) = &event {
            self.finished = Some(completion.clone());
        }
        Some(event)
    }

    /// Waits for the job to finish, discarding remaining events.
    pub async fn wait(mut self) -> Completion {
        while self.next_event().await.is_some() {}
        self.into_completion().await
    }

    /// Waits for the job to finish and returns every remaining event,
    /// terminal event included.
    pub async fn collect(mut self) -> (Vec<RunnerEvent>, Completion) {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        let completion = self.into_completion().await;
        (events, completion)
    }

    async fn into_completion(self) -> Completion {
        if let Some(completion) = self.finished {
            return completion;
        }

        // The stream closed without a terminal event: the task died.
        match self.task.await {
            Err(e) if e.is_panic() => {
                tracing::error!(job_id = %self.id, "Job panicked");
                Completion::failed("job panicked")
            }
            _ => Completion::failed("job ended without reporting completion"),
        }
    }
}

//! Audit event types and emission functions.

use crate::core::{Completion, JobKind, ScanRequest, ScanResult};
use crate::quarantine::QuarantineRecord;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Scanned path.
    pub target: String,

    /// Files reported as scanned.
    pub scanned_count: u64,

    /// Files reported as infected.
    pub infected_count: u64,

    /// Outcome label (`clean`, `threats_found`, `failed`, `cancelled`).
    pub outcome: String,
}

impl ScanAuditEvent {
    /// Builds the event from a finished scan.
    pub fn new(target: &str, result: &ScanResult, completion: &Completion) -> Self {
        Self {
            timestamp: Utc::now(),
            target: target.to_string(),
            scanned_count: result.scanned_count,
            infected_count: result.infected_count,
            outcome: outcome_label(completion).to_string(),
        }
    }
}

impl AuditEvent for ScanAuditEvent {
    fn event_type(&self) -> &'static str {
        "scan_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for a quarantine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Stored file name inside the quarantine directory.
    pub stored_filename: String,

    /// Original location of the file.
    pub original: String,

    /// Operation performed (`quarantine`, `restore`, `delete`).
    pub operation: String,

    /// Content digest, when recorded.
    pub blake3: Option<String>,
}

impl QuarantineAuditEvent {
    /// Builds the event from a record.
    pub fn new(record: &QuarantineRecord, operation: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            stored_filename: record.stored_filename.clone(),
            original: record.original.clone(),
            operation: operation.to_string(),
            blake3: record.blake3.clone(),
        }
    }
}

impl AuditEvent for QuarantineAuditEvent {
    fn event_type(&self) -> &'static str {
        "quarantine_operation"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn outcome_label(completion: &Completion) -> &'static str {
    match completion {
        Completion::Clean { .. } => "clean",
        Completion::ThreatsFound { .. } => "threats_found",
        Completion::UpdateComplete => "updated",
        Completion::Cancelled => "cancelled",
        Completion::Failed { .. } => "failed",
    }
}

/// Emits an audit event for a job starting.
///
/// Later events of the job are recorded inside its `job` span, which carries the same ID.
pub fn emit_job_started(job_id: &str, kind: JobKind) {
    tracing::info!(
        target: "clamkeeper::audit",
        event_type = "job_started",
        job_id = %job_id,
        kind = %kind,
        "Job started"
    );
}

/// Emits an audit event for a scan starting.
pub fn emit_scan_started(request: &ScanRequest) {
    tracing::info!(
        target: "clamkeeper::audit",
        event_type = "scan_started",
        target_path = %request.path.display(),
        recursive = request.recursive,
        auto_quarantine = request.auto_quarantine,
        "Scan started"
    );
}

/// Emits an audit event for a completed scan.
pub fn emit_scan_completed(event: &ScanAuditEvent) {
    tracing::info!(
        target: "clamkeeper::audit",
        event_type = event.event_type(),
        target_path = %event.target,
        scanned_count = event.scanned_count,
        infected_count = event.infected_count,
        outcome = %event.outcome,
        "Scan completed"
    );
}

/// Emits an audit event for a finished signature update.
pub fn emit_update_completed(exit_code: Option<i32>, completion: &Completion) {
    tracing::info!(
        target: "clamkeeper::audit",
        event_type = "update_completed",
        exit_code = ?exit_code,
        outcome = outcome_label(completion),
        "Signature update completed"
    );
}

/// Emits an audit event for a quarantine operation.
pub fn emit_quarantine_event(record: &QuarantineRecord, operation: &str) {
    let event = QuarantineAuditEvent::new(record, operation);
    tracing::info!(
        target: "clamkeeper::audit",
        event_type = event.event_type(),
        stored_filename = %event.stored_filename,
        original = %event.original,
        operation = %event.operation,
        blake3 = ?event.blake3,
        "Quarantine operation performed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_audit_event_from_result() {
        let result = ScanResult::new(12, 1);
        let completion = Completion::ThreatsFound {
            infected: 1,
            quarantined: Some(1),
        };
        let event = ScanAuditEvent::new("/home/u/Downloads", &result, &completion);

        assert_eq!(event.event_type(), "scan_completed");
        assert_eq!(event.scanned_count, 12);
        assert_eq!(event.outcome, "threats_found");
    }

    #[test]
    fn test_quarantine_audit_event_serializes() {
        let record = QuarantineRecord::new("/tmp/b.exe", "20240309_070501", "20240309_070501_b.exe")
            .with_blake3("abc");
        let event = QuarantineAuditEvent::new(&record, "delete");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["operation"], "delete");
        assert_eq!(value["original"], "/tmp/b.exe");
        assert_eq!(value["blake3"], "abc");
    }
}

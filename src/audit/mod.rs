//! Structured audit logging.
//!
//! This module emits structured audit events through the `tracing` crate
//! under the `clamkeeper::audit` target. Any subscriber (JSON file, journald,
//! etc.) can capture them separately from ordinary diagnostics.

mod events;

pub use events::{
    emit_job_started, emit_quarantine_event, emit_scan_completed, emit_scan_started,
    emit_update_completed, AuditEvent, QuarantineAuditEvent, ScanAuditEvent,
};

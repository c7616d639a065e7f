//! Port for structured engine records.
//!
//! Defines the [`RecordSink`] trait that receives one record per strategy
//! result and one per verdict, for external logging or metrics collectors.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port carries the
//! machine-readable outcome of every request.

use quorum_domain::Record;

/// Destination for engine records.
///
/// `emit` is synchronous and non-fallible so that a failing collector never
/// disturbs resolution; implementations drop records they cannot write.
pub trait RecordSink: Send + Sync {
    /// Record one event.
    fn emit(&self, record: Record);
}

/// No-op implementation for tests and when recording is disabled.
pub struct NoRecordSink;

impl RecordSink for NoRecordSink {
    fn emit(&self, _record: Record) {}
}

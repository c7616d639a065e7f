//! Record logging infrastructure.
//!
//! Provides [`JsonlRecordSink`] for writing engine records to JSONL files.

mod jsonl_sink;

pub use jsonl_sink::JsonlRecordSink;

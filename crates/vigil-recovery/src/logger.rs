// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Append-only local sink for failure and recovery-outcome records.
//!
//! The [`ErrorLogger`] assigns sequence numbers, builds immutable
//! [`FailureRecord`]s, and forwards them to a pluggable [`ErrorSink`]. It has
//! no queueing or retry logic of its own, and it never lets a sink panic
//! escape: a boundary's capture path must be incapable of failing.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use vigil_core::recovery::{CaptureContext, ErrorSink, FailureInfo, FailureRecord, RecoveryAction};

/// Sink writing records through the `log` facade.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn log_error(&self, record: &FailureRecord) {
        log::error!(
            "[{}] rendering failure #{} ({}): {}",
            record.context.boundary_name,
            record.sequence,
            record.id,
            record.error.message
        );
        if let Some(trace) = &record.context.component_trace {
            log::error!("[{}] failing subtree: {}", record.context.boundary_name, trace);
        }
    }

    fn log_recovery(&self, action: RecoveryAction, success: bool) {
        log::info!("recovery action={action} success={success}");
    }
}

/// One recovery outcome retained by [`MemorySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryEvent {
    /// The action that was taken.
    pub action: RecoveryAction,
    /// Whether the action completed.
    pub success: bool,
}

/// Sink retaining every record in memory, in arrival order.
///
/// Useful as a local audit trail and as the sink of choice in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<FailureRecord>>,
    recoveries: Mutex<Vec<RecoveryEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every failure record received so far.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a copy of every recovery event received so far.
    pub fn recoveries(&self) -> Vec<RecoveryEvent> {
        self.recoveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorSink for MemorySink {
    fn log_error(&self, record: &FailureRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }

    fn log_recovery(&self, action: RecoveryAction, success: bool) {
        self.recoveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecoveryEvent { action, success });
    }
}

/// Builds immutable failure records and forwards them to a sink.
///
/// Cloneable: clones share the sink and the sequence counter, so several
/// boundaries can log through one logical logger.
#[derive(Clone)]
pub struct ErrorLogger {
    sink: Arc<dyn ErrorSink>,
    sequence: Arc<AtomicU64>,
}

impl ErrorLogger {
    /// Creates a logger over the given sink.
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            sink,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a logger writing through the `log` facade.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink))
    }

    /// Records one rendering failure and returns the immutable record.
    ///
    /// Never panics: a panicking sink is caught and reported through `log`.
    pub fn log_error(&self, error: FailureInfo, context: CaptureContext) -> Arc<FailureRecord> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = Arc::new(FailureRecord::new(sequence, error, context));
        let sink = &self.sink;
        if catch_unwind(AssertUnwindSafe(|| sink.log_error(&record))).is_err() {
            log::error!("error sink panicked while logging failure #{sequence}");
        }
        record
    }

    /// Records one recovery outcome. Never panics.
    pub fn log_recovery(&self, action: RecoveryAction, success: bool) {
        let sink = &self.sink;
        if catch_unwind(AssertUnwindSafe(|| sink.log_recovery(action, success))).is_err() {
            log::error!("error sink panicked while logging recovery action={action}");
        }
    }
}

impl fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::recovery::BoundaryLevel;

    fn dummy_context() -> CaptureContext {
        CaptureContext {
            boundary_name: "test".to_string(),
            boundary_level: BoundaryLevel::Component,
            config_snapshot: serde_json::Value::Null,
            component_trace: None,
            surface: None,
            url: None,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn sequence_numbers_are_monotonic() {
        let sink = Arc::new(MemorySink::new());
        let logger = ErrorLogger::new(sink.clone());
        let first = logger.log_error(FailureInfo::new("a"), dummy_context());
        let second = logger.log_error(FailureInfo::new("b"), dummy_context());
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(sink.records().len(), 2);
    }

    #[test]
    fn clones_share_the_sequence() {
        let logger = ErrorLogger::new(Arc::new(MemorySink::new()));
        let clone = logger.clone();
        let first = logger.log_error(FailureInfo::new("a"), dummy_context());
        let second = clone.log_error(FailureInfo::new("b"), dummy_context());
        assert_eq!(first.sequence + 1, second.sequence);
    }

    #[test]
    fn recovery_events_reach_the_sink() {
        let sink = Arc::new(MemorySink::new());
        let logger = ErrorLogger::new(sink.clone());
        logger.log_recovery(RecoveryAction::Reset, true);
        logger.log_recovery(RecoveryAction::Retry, true);
        let events = sink.recoveries();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, RecoveryAction::Reset);
        assert_eq!(events[1].action, RecoveryAction::Retry);
    }

    #[test]
    fn panicking_sink_is_contained() {
        #[derive(Debug)]
        struct ExplodingSink;
        impl ErrorSink for ExplodingSink {
            fn log_error(&self, _record: &FailureRecord) {
                panic!("sink failure");
            }
            fn log_recovery(&self, _action: RecoveryAction, _success: bool) {
                panic!("sink failure");
            }
        }

        let logger = ErrorLogger::new(Arc::new(ExplodingSink));
        let record = logger.log_error(FailureInfo::new("boom"), dummy_context());
        assert_eq!(record.sequence, 1);
        logger.log_recovery(RecoveryAction::Reset, true);
    }
}

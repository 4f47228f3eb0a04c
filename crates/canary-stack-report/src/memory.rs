//! In-memory implementation of the ReportSink trait.
//!
//! This is primarily for testing: snapshots are kept in emission order and
//! can be inspected afterwards.

use std::sync::{PoisonError, RwLock};

use canary_stack_core::DiagnosticSnapshot;

use crate::error::Result;
use crate::traits::ReportSink;

/// In-memory sink. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: RwLock<Vec<DiagnosticSnapshot>>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots emitted so far, oldest first.
    pub fn snapshots(&self) -> Vec<DiagnosticSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<DiagnosticSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        // A panicking test may poison the lock mid-report; keep recording.
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_stack_core::{CallSite, GuardedStack, Provenance, StackConfig};

    fn snapshot(values: &[f64]) -> DiagnosticSnapshot {
        let mut stack = GuardedStack::new(Provenance::UNKNOWN, StackConfig::default()).unwrap();
        for &v in values {
            stack.push(v).unwrap();
        }
        stack.snapshot(CallSite::new("test.rs", 1, "dump"))
    }

    #[test]
    fn test_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.emit(&snapshot(&[1.0])).unwrap();
        sink.emit(&snapshot(&[1.0, 2.0])).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.snapshots()[0].size, 1);
        assert_eq!(sink.last().unwrap().size, 2);
    }

    #[test]
    fn test_clear() {
        let sink = MemorySink::new();
        sink.emit(&snapshot(&[])).unwrap();
        sink.clear();
        assert!(sink.is_empty());
        assert!(sink.last().is_none());
    }
}

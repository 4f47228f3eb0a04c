//! ReportSink trait: where diagnostic snapshots go.
//!
//! The stack facade emits one snapshot per confirmed corruption, plus any
//! snapshot requested explicitly. Sinks decide whether that means a file,
//! the log, or a vector in memory.

use std::sync::Arc;

use canary_stack_core::DiagnosticSnapshot;

use crate::error::Result;

/// A destination for diagnostic snapshots.
///
/// Methods take `&self`; sinks that keep state use interior mutability so a
/// single sink can be shared between stacks behind an `Arc`.
///
/// # Design Notes
///
/// - **Best effort on the fatal path**: a failing `emit` is logged by the
///   caller and the abort still happens. Implementations must not panic.
/// - **No trust in the snapshot**: the snapshot may describe a corrupted
///   stack; sinks render what they are given and never re-validate.
pub trait ReportSink: Send + Sync {
    /// Persist or display one snapshot.
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()>;

    /// Flush buffered output, if any.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: ReportSink + ?Sized> ReportSink for Arc<T> {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        (**self).emit(snapshot)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        (**self).emit(snapshot)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&self, _snapshot: &DiagnosticSnapshot) -> Result<()> {
        Ok(())
    }
}

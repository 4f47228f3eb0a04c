//! Fan a snapshot out to several sinks.

use canary_stack_core::DiagnosticSnapshot;

use crate::error::{ReportError, Result};
use crate::traits::ReportSink;

/// Forwards every snapshot to each inner sink in order.
///
/// A failing sink does not stop the others. If any failed, the first error
/// is returned wrapped in [`ReportError::Fanout`].
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn collect(&self, mut f: impl FnMut(&dyn ReportSink) -> Result<()>) -> Result<()> {
        let total = self.sinks.len();
        let mut failed = 0;
        let mut first = None;

        for sink in &self.sinks {
            if let Err(e) = f(sink.as_ref()) {
                failed += 1;
                first.get_or_insert(e);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(ReportError::Fanout {
                failed,
                total,
                first: Box::new(first),
            }),
        }
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl ReportSink for FanoutSink {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        self.collect(|sink| sink.emit(snapshot))
    }

    fn flush(&self) -> Result<()> {
        self.collect(|sink| sink.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySink;
    use canary_stack_core::{CallSite, GuardedStack, Provenance, StackConfig};
    use std::sync::Arc;

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn emit(&self, _snapshot: &DiagnosticSnapshot) -> Result<()> {
            Err(ReportError::Serialization("refused".into()))
        }
    }

    fn snapshot() -> DiagnosticSnapshot {
        let stack = GuardedStack::new(Provenance::UNKNOWN, StackConfig::default()).unwrap();
        stack.snapshot(CallSite::new("t.rs", 1, "dump"))
    }

    #[test]
    fn test_all_sinks_receive() {
        let a = Arc::new(MemorySink::new());
        let b = Arc::new(MemorySink::new());
        let fanout = FanoutSink::new().with(a.clone()).with(b.clone());

        fanout.emit(&snapshot()).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_failure_does_not_stop_later_sinks() {
        let memory = Arc::new(MemorySink::new());
        let fanout = FanoutSink::new()
            .with(FailingSink)
            .with(memory.clone())
            .with(FailingSink);

        let err = fanout.emit(&snapshot()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Fanout {
                failed: 2,
                total: 3,
                ..
            }
        ));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_empty_fanout_is_ok() {
        assert!(FanoutSink::new().emit(&snapshot()).is_ok());
    }
}

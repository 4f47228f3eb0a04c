//! CanaryStack: the guarded stack wired to a sink and a fatal handler.
//!
//! Every operation runs the core stack's checks. Recoverable conditions come
//! back as [`Error`]; a confirmed corruption is reported once and then handed
//! to the [`FatalHandler`], which does not return.

use canary_stack_core::{
    CallSite, DiagnosticSnapshot, Element, GuardedStack, IntegrityError, Popped, Provenance,
    Resize, ResizeKind, StackConfig, StackError,
};
use canary_stack_report::{ReportSink, TracingSink};

use crate::error::{Error, Result};
use crate::fatal::{AbortHandler, FatalHandler};

/// Operation counters for one stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackStats {
    pub pushes: u64,
    pub pops: u64,
    /// Pops rejected because the stack was empty.
    pub underflows: u64,
    pub grows: u64,
    pub shrinks: u64,
    pub peak_capacity: usize,
}

/// Builder for [`CanaryStack`].
pub struct CanaryStackBuilder<S> {
    provenance: Provenance,
    config: StackConfig,
    sink: S,
    fatal: Box<dyn FatalHandler>,
}

impl<S: ReportSink> CanaryStackBuilder<S> {
    pub fn config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the sink that receives snapshots.
    pub fn sink<T: ReportSink>(self, sink: T) -> CanaryStackBuilder<T> {
        CanaryStackBuilder {
            provenance: self.provenance,
            config: self.config,
            sink,
            fatal: self.fatal,
        }
    }

    pub fn fatal_handler(mut self, handler: impl FatalHandler + 'static) -> Self {
        self.fatal = Box::new(handler);
        self
    }

    /// Validate the configuration and construct the stack.
    pub fn build(self) -> Result<CanaryStack<S>> {
        let inner = GuardedStack::new(self.provenance, self.config)?;

        tracing::debug!(
            stack = self.provenance.name,
            born_at = %self.provenance,
            capacity = inner.capacity(),
            "stack constructed"
        );

        let stats = StackStats {
            peak_capacity: inner.capacity(),
            ..StackStats::default()
        };

        Ok(CanaryStack {
            inner,
            sink: self.sink,
            fatal: self.fatal,
            stats,
        })
    }
}

/// A self-verifying stack of [`Element`]s.
///
/// # Example
///
/// ```rust,no_run
/// use canary_stack::{canary_stack, MemorySink, StackConfig};
///
/// let mut stk = canary_stack!(stk, StackConfig::default(), MemorySink::new()).unwrap();
/// stk.push(100.0).unwrap();
/// assert_eq!(stk.pop().unwrap(), 100.0);
/// ```
pub struct CanaryStack<S: ReportSink = TracingSink> {
    inner: GuardedStack,
    sink: S,
    fatal: Box<dyn FatalHandler>,
    stats: StackStats,
}

impl CanaryStack<TracingSink> {
    /// Start building a stack. Defaults: [`StackConfig::default`],
    /// [`TracingSink`], [`AbortHandler`].
    pub fn builder(provenance: Provenance) -> CanaryStackBuilder<TracingSink> {
        CanaryStackBuilder {
            provenance,
            config: StackConfig::default(),
            sink: TracingSink::new(),
            fatal: Box::new(AbortHandler),
        }
    }
}

impl<S: ReportSink> CanaryStack<S> {
    // ─────────────────────────────────────────────────────────────────────────
    // Stack Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Push `value`, growing the buffer if it is full.
    #[track_caller]
    pub fn push(&mut self, value: Element) -> Result<()> {
        let site = CallSite::caller("push");
        match self.inner.push(value) {
            Ok(resize) => {
                self.stats.pushes += 1;
                if let Some(resize) = resize {
                    self.record_resize(resize);
                }
                Ok(())
            }
            Err(e) => Err(self.escalate(e, site)),
        }
    }

    /// Pop the top value. An empty stack yields [`Error::Underflow`].
    #[track_caller]
    pub fn pop(&mut self) -> Result<Element> {
        let site = CallSite::caller("pop");
        match self.inner.pop() {
            Ok(Popped { value, resize }) => {
                self.stats.pops += 1;
                if let Some(resize) = resize {
                    self.record_resize(resize);
                }
                Ok(value)
            }
            Err(StackError::Underflow) => {
                self.stats.underflows += 1;
                tracing::warn!(
                    stack = self.inner.provenance().name,
                    call_site = %site,
                    "pop from an empty stack"
                );
                Err(Error::Underflow)
            }
            Err(e) => Err(self.escalate(e, site)),
        }
    }

    /// Validate, scrub and release the stack.
    #[track_caller]
    pub fn destroy(mut self) -> Result<()> {
        let site = CallSite::caller("destroy");
        if let Err(e) = self.inner.validate() {
            self.fail(e, site);
        }

        let name = self.inner.provenance().name;
        self.inner.destroy()?;
        tracing::debug!(stack = name, call_site = %site, "stack destroyed");
        Ok(())
    }

    /// Validate without mutating. Corruption takes the fatal path.
    #[track_caller]
    pub fn check(&mut self) {
        let site = CallSite::caller("check");
        if let Err(e) = self.inner.validate() {
            self.fail(e, site);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot the stack as seen from the caller.
    #[track_caller]
    pub fn dump(&self) -> DiagnosticSnapshot {
        self.dump_at(CallSite::caller("dump"))
    }

    /// Snapshot the stack as seen from an explicit call site.
    pub fn dump_at(&self, call_site: CallSite) -> DiagnosticSnapshot {
        self.inner.snapshot(call_site)
    }

    /// Snapshot the stack and emit it to the sink.
    #[track_caller]
    pub fn report(&self) -> Result<DiagnosticSnapshot> {
        let snapshot = self.dump_at(CallSite::caller("report"));
        self.sink.emit(&snapshot)?;
        tracing::debug!(
            stack = self.inner.provenance().name,
            snapshot = %snapshot.id(),
            "snapshot reported"
        );
        Ok(snapshot)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The live elements, bottom first.
    pub fn inspect(&self) -> &[Element] {
        self.inner.live()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn stats(&self) -> &StackStats {
        &self.stats
    }

    pub fn provenance(&self) -> &Provenance {
        self.inner.provenance()
    }

    pub fn config(&self) -> &StackConfig {
        self.inner.config()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The underlying core stack.
    pub fn guarded(&self) -> &GuardedStack {
        &self.inner
    }

    /// Raw write access for simulating corruption.
    #[cfg(feature = "fault-injection")]
    pub fn fault_injector(&mut self) -> canary_stack_core::FaultInjector<'_> {
        self.inner.fault_injector()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fatal Path
    // ─────────────────────────────────────────────────────────────────────────

    fn record_resize(&mut self, resize: Resize) {
        match resize.kind {
            ResizeKind::Grow => self.stats.grows += 1,
            ResizeKind::Shrink => self.stats.shrinks += 1,
        }
        self.stats.peak_capacity = self.stats.peak_capacity.max(resize.to);
        tracing::debug!(
            stack = self.inner.provenance().name,
            kind = ?resize.kind,
            from = resize.from,
            to = resize.to,
            "buffer resized"
        );
    }

    fn escalate(&mut self, error: StackError, site: CallSite) -> Error {
        match error {
            StackError::Corrupted(e) => self.fail(e, site),
            other => Error::from(other),
        }
    }

    /// Report once, scrub, then hand over to the fatal handler.
    fn fail(&mut self, error: IntegrityError, site: CallSite) -> ! {
        let snapshot = self.inner.snapshot(site);
        tracing::error!(
            stack = self.inner.provenance().name,
            call_site = %site,
            %error,
            snapshot = %snapshot.id(),
            "stack integrity violated"
        );

        if let Err(e) = self.sink.emit(&snapshot) {
            tracing::error!(error = %e, "failed to emit diagnostic snapshot");
        }
        if let Err(e) = self.sink.flush() {
            tracing::error!(error = %e, "failed to flush report sink");
        }

        self.inner.scrub();
        self.fatal.on_corruption(&error, &snapshot)
    }
}

impl<S: ReportSink> std::fmt::Debug for CanaryStack<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanaryStack")
            .field("inner", &self.inner)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fatal::PanicHandler;
    use canary_stack_core::GuardSide;
    use canary_stack_report::{MemorySink, ReportError};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    fn memory_stack() -> (CanaryStack<Arc<MemorySink>>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let stack = CanaryStack::builder(Provenance::new("stk", "main.rs", 7, "main"))
            .sink(sink.clone())
            .fatal_handler(PanicHandler)
            .build()
            .unwrap();
        (stack, sink)
    }

    #[test]
    fn test_push_pop_and_stats() {
        let (mut stack, _) = memory_stack();
        for i in 1..=17 {
            stack.push(f64::from(i)).unwrap();
        }
        assert_eq!(stack.capacity(), 32);
        assert_eq!(stack.pop().unwrap(), 17.0);
        assert_eq!(stack.len(), 16);

        let stats = *stack.stats();
        assert_eq!(stats.pushes, 17);
        assert_eq!(stats.pops, 1);
        assert_eq!(stats.grows, 1);
        assert_eq!(stats.peak_capacity, 32);
    }

    #[test]
    fn test_underflow_is_recoverable() {
        let (mut stack, sink) = memory_stack();
        assert!(matches!(stack.pop(), Err(Error::Underflow)));
        assert_eq!(stack.stats().underflows, 1);
        assert!(sink.is_empty());

        stack.check();
        stack.push(3.0).unwrap();
        assert_eq!(stack.inspect(), &[3.0]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CanaryStack::builder(Provenance::UNKNOWN)
            .config(StackConfig::default().with_initial_capacity(0))
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_allocation_failure_is_recoverable() {
        let sink = Arc::new(MemorySink::new());
        let result = CanaryStack::builder(Provenance::UNKNOWN)
            .config(StackConfig::default().with_initial_capacity(usize::MAX / 16))
            .sink(sink.clone())
            .fatal_handler(PanicHandler)
            .build();
        assert!(matches!(result, Err(Error::AllocationFailed { .. })));
        assert!(sink.is_empty());

        let mut stack = CanaryStack::builder(Provenance::UNKNOWN)
            .config(
                StackConfig::default()
                    .with_initial_capacity(1)
                    .with_growth_factor(usize::MAX / 16),
            )
            .sink(sink.clone())
            .fatal_handler(PanicHandler)
            .build()
            .unwrap();
        stack.push(1.0).unwrap();
        assert!(matches!(stack.push(2.0), Err(Error::AllocationFailed { .. })));
        assert!(sink.is_empty());
        assert_eq!(stack.inspect(), &[1.0]);
        assert_eq!(stack.stats().pushes, 1);
        stack.check();
    }

    #[test]
    fn test_report_emits_to_sink() {
        let (mut stack, sink) = memory_stack();
        stack.push(9.0).unwrap();

        let snapshot = stack.report().unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.last().unwrap(), snapshot);
        assert_eq!(snapshot.call_site.operation, "report");
        assert!(snapshot.call_site.file.ends_with("stack.rs"));
    }

    #[test]
    fn test_report_surfaces_sink_error() {
        struct Refusing;
        impl ReportSink for Refusing {
            fn emit(&self, _: &DiagnosticSnapshot) -> canary_stack_report::Result<()> {
                Err(ReportError::Serialization("no".into()))
            }
        }

        let stack = CanaryStack::builder(Provenance::UNKNOWN)
            .sink(Refusing)
            .build()
            .unwrap();
        assert!(matches!(stack.report(), Err(Error::Report(_))));
    }

    #[test]
    fn test_dump_captures_caller() {
        let (stack, _) = memory_stack();
        let snapshot = stack.dump();
        assert_eq!(snapshot.call_site.line, line!() - 1);
        assert_eq!(snapshot.provenance.name, "stk");
    }

    #[test]
    fn test_corruption_reports_once_then_panics() {
        let (mut stack, sink) = memory_stack();
        stack.push(1.0).unwrap();
        stack
            .inner
            .fault_injector()
            .set_struct_guard(GuardSide::High, 0);

        let result = panic::catch_unwind(AssertUnwindSafe(|| stack.push(2.0)));
        assert!(result.is_err());

        assert_eq!(sink.len(), 1);
        let snapshot = sink.last().unwrap();
        assert_eq!(
            snapshot.verdict,
            Some(IntegrityError::StructureCorrupted {
                side: GuardSide::High
            })
        );
        assert_eq!(snapshot.call_site.operation, "push");
        assert_eq!(snapshot.slots[0].value, 1.0);
        assert!(stack
            .guarded()
            .raw_buffer()
            .unwrap()
            .iter()
            .all(|&e| e == 0.0));
    }

    #[test]
    fn test_check_routes_to_fatal_path() {
        let (mut stack, sink) = memory_stack();
        stack.inner.fault_injector().write_element(0, 4.0);

        let result = panic::catch_unwind(AssertUnwindSafe(|| stack.check()));
        assert!(result.is_err());
        assert_eq!(
            sink.last().unwrap().verdict,
            Some(IntegrityError::BufferContentCorrupted)
        );
    }

    #[test]
    fn test_destroy() {
        let (mut stack, sink) = memory_stack();
        stack.push(1.0).unwrap();
        assert!(stack.destroy().is_ok());
        assert!(sink.is_empty());
    }
}

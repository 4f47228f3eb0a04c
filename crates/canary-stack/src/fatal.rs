//! What happens after a corruption has been reported.

use canary_stack_core::{DiagnosticSnapshot, IntegrityError};

/// Terminates the current computation after a confirmed corruption.
///
/// Called exactly once, after the snapshot has been emitted and the buffer
/// scrubbed. Never returns.
pub trait FatalHandler: Send + Sync {
    fn on_corruption(&self, error: &IntegrityError, snapshot: &DiagnosticSnapshot) -> !;
}

/// Prints a one-line summary to stderr and aborts the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortHandler;

impl FatalHandler for AbortHandler {
    fn on_corruption(&self, error: &IntegrityError, snapshot: &DiagnosticSnapshot) -> ! {
        eprintln!(
            "canary-stack: {} corrupted at {}: {} (snapshot {})",
            snapshot.provenance.name,
            snapshot.call_site,
            error,
            snapshot.id()
        );
        std::process::abort()
    }
}

/// Panics instead of aborting, so tests can catch the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicHandler;

impl FatalHandler for PanicHandler {
    fn on_corruption(&self, error: &IntegrityError, snapshot: &DiagnosticSnapshot) -> ! {
        panic!(
            "stack {} corrupted at {}: {}",
            snapshot.provenance.name, snapshot.call_site, error
        )
    }
}

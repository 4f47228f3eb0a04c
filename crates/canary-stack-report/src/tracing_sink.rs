//! Sink that writes snapshots to the `tracing` log.

use canary_stack_core::DiagnosticSnapshot;

use crate::error::Result;
use crate::render::render_dump;
use crate::traits::ReportSink;

/// Emits each snapshot as one event: `error` for corrupted stacks, `info`
/// otherwise. The rendered dump is attached as the `dump` field.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    include_dump: bool,
}

impl TracingSink {
    pub fn new() -> Self {
        Self { include_dump: true }
    }

    /// Log only the summary fields.
    pub fn summary_only() -> Self {
        Self {
            include_dump: false,
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for TracingSink {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        let dump = if self.include_dump {
            render_dump(snapshot)
        } else {
            String::new()
        };
        let id = snapshot.id();

        match &snapshot.verdict {
            Some(verdict) => tracing::error!(
                snapshot = %id,
                stack = snapshot.provenance.name,
                call_site = %snapshot.call_site,
                size = snapshot.size,
                capacity = snapshot.capacity,
                %verdict,
                dump = %dump,
                "stack corrupted"
            ),
            None => tracing::info!(
                snapshot = %id,
                stack = snapshot.provenance.name,
                call_site = %snapshot.call_site,
                size = snapshot.size,
                capacity = snapshot.capacity,
                dump = %dump,
                "stack snapshot"
            ),
        }
        Ok(())
    }
}

//! # Canary Stack
//!
//! A growable stack of `f64` that verifies its own integrity on every
//! operation and produces a postmortem dump when it finds corruption.
//!
//! ## Overview
//!
//! [`CanaryStack`] wraps the core [`GuardedStack`] with two collaborators: a
//! [`ReportSink`] that receives diagnostic snapshots and a [`FatalHandler`]
//! that ends the computation once a corruption has been reported.
//!
//! ## Key Types
//!
//! - [`CanaryStack`] - The stack facade
//! - [`CanaryStackBuilder`] - Configuration, sink and fatal handler
//! - [`FatalHandler`] - [`AbortHandler`] by default, [`PanicHandler`] for tests
//! - [`StackConfig`] - Sentinels, growth factors, hash seed
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canary_stack::{canary_stack, StackConfig, TextFileSink, TextLayout};
//!
//! fn main() -> canary_stack::Result<()> {
//!     let sink = TextFileSink::new("log.txt", TextLayout::Dump);
//!     let mut stk = canary_stack!(stk, StackConfig::default(), sink)?;
//!
//!     stk.push(100.0)?;
//!     stk.push(200.0)?;
//!     assert_eq!(stk.pop()?, 200.0);
//!
//!     stk.report()?;
//!     stk.destroy()
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Recoverable vs fatal**: underflow and allocation failure are returned;
//!   integrity violations are reported once and never returned
//! - **Caller locations**: operations are `#[track_caller]`, so snapshots name
//!   the line that called `push`, not a line inside this crate

pub mod error;
pub mod fatal;
pub mod stack;

pub use error::{Error, Result};
pub use fatal::{AbortHandler, FatalHandler, PanicHandler};
pub use stack::{CanaryStack, CanaryStackBuilder, StackStats};

// Re-export commonly used types
pub use canary_stack_core::{
    function_name, provenance, CallSite, DiagnosticSnapshot, Element, GuardSide, GuardedStack,
    IntegrityError, Provenance, SlotState, SnapshotId, StackConfig, DEFAULT_POISON,
    DEFAULT_SENTINEL,
};
pub use canary_stack_report::{
    render_data, render_dump, FanoutSink, JsonLinesSink, MemorySink, NullSink, ReportSink,
    TextFileSink, TextLayout, TracingSink,
};

/// Build a [`CanaryStack`] named after a variable, capturing the file, line
/// and enclosing function of the invocation.
///
/// `canary_stack!(name)` uses the default configuration, sink and fatal
/// handler; `canary_stack!(name, config, sink)` sets the first two and
/// `canary_stack!(name, config, sink, fatal)` sets all three.
#[macro_export]
macro_rules! canary_stack {
    ($name:ident) => {
        $crate::CanaryStack::builder($crate::provenance!($name)).build()
    };
    ($name:ident, $config:expr, $sink:expr) => {
        $crate::CanaryStack::builder($crate::provenance!($name))
            .config($config)
            .sink($sink)
            .build()
    };
    ($name:ident, $config:expr, $sink:expr, $fatal:expr) => {
        $crate::CanaryStack::builder($crate::provenance!($name))
            .config($config)
            .sink($sink)
            .fatal_handler($fatal)
            .build()
    };
}

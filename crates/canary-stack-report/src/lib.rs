//! # Canary Stack Report
//!
//! Where diagnostic snapshots go. Provides the [`ReportSink`] trait, text
//! renderings of a snapshot, and sinks for memory, files and the log.
//!
//! ## Key Types
//!
//! - [`ReportSink`] - The trait every destination implements
//! - [`MemorySink`] - Keeps snapshots in memory, for tests
//! - [`TextFileSink`] - Rewrites one file with the latest dump
//! - [`JsonLinesSink`] - Appends one JSON record per snapshot
//! - [`TracingSink`] - Logs snapshots through `tracing`
//! - [`FanoutSink`] - Forwards to several sinks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canary_stack_core::{CallSite, GuardedStack, Provenance, StackConfig};
//! use canary_stack_report::{render_dump, ReportSink, TextFileSink, TextLayout};
//!
//! let stack = GuardedStack::new(Provenance::UNKNOWN, StackConfig::default()).unwrap();
//! let snapshot = stack.snapshot(CallSite::new("main.rs", 1, "dump"));
//!
//! println!("{}", render_dump(&snapshot));
//!
//! let sink = TextFileSink::new("log.txt", TextLayout::Data);
//! sink.emit(&snapshot).unwrap();
//! ```
//!
//! ## Design Notes
//!
//! - **Render, never validate**: sinks print what the snapshot holds
//! - **Fatal path friendly**: file sinks flush before `emit` returns

pub mod error;
pub mod fanout;
pub mod file;
pub mod memory;
pub mod render;
pub mod tracing_sink;
pub mod traits;

pub use error::{ReportError, Result};
pub use fanout::FanoutSink;
pub use file::{JsonLinesSink, TextFileSink, TextLayout};
pub use memory::MemorySink;
pub use render::{render_data, render_dump, ELEMENTS_PER_ROW};
pub use tracing_sink::TracingSink;
pub use traits::{NullSink, ReportSink};

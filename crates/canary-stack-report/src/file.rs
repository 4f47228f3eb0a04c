//! File-backed sinks.
//!
//! [`TextFileSink`] keeps the latest rendering in a single file, rewritten on
//! every emit. [`JsonLinesSink`] appends one JSON record per snapshot.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use canary_stack_core::DiagnosticSnapshot;

use crate::error::Result;
use crate::render::{render_data, render_dump};
use crate::traits::ReportSink;

/// Which text rendering a [`TextFileSink`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLayout {
    /// Full postmortem dump.
    #[default]
    Dump,
    /// Element listing only.
    Data,
}

/// Writes the rendered snapshot to a file, replacing previous contents.
#[derive(Debug, Clone)]
pub struct TextFileSink {
    path: PathBuf,
    layout: TextLayout,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>, layout: TextLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> TextLayout {
        self.layout
    }
}

impl ReportSink for TextFileSink {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        let text = match self.layout {
            TextLayout::Dump => render_dump(snapshot),
            TextLayout::Data => render_data(snapshot),
        };
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    id: String,
    #[serde(flatten)]
    snapshot: &'a DiagnosticSnapshot,
}

/// Appends snapshots to a file, one JSON object per line.
///
/// Each line carries the snapshot's content id alongside its fields.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonLinesSink {
    fn emit(&self, snapshot: &DiagnosticSnapshot) -> Result<()> {
        let record = JsonRecord {
            id: snapshot.id().to_hex(),
            snapshot,
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        // The process may abort right after this returns.
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}

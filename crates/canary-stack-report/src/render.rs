//! Plain-text rendering of snapshots.
//!
//! Two layouts: the dump (everything needed for a postmortem) and the data
//! listing (elements only, ten per row).

use std::fmt::Write;

use canary_stack_core::{DiagnosticSnapshot, Element, SlotState};

/// Elements per row in the data listing.
pub const ELEMENTS_PER_ROW: usize = 10;

fn fmt_addr(addr: Option<usize>) -> String {
    match addr {
        Some(a) => format!("{a:#x}"),
        None => "null".to_owned(),
    }
}

fn fmt_guard(guard: Option<Element>) -> String {
    match guard {
        Some(g) if g.fract() == 0.0 && g >= 0.0 && g <= u64::MAX as Element => {
            format!("{:#X}", g as u64)
        }
        Some(g) => format!("{g}"),
        None => "<out of range>".to_owned(),
    }
}

/// Render the dump layout.
pub fn render_dump(s: &DiagnosticSnapshot) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_dump(&mut out, s);
    out
}

fn write_dump(out: &mut String, s: &DiagnosticSnapshot) -> std::fmt::Result {
    writeln!(out, "GuardedStack [{:#x}]", s.stack_addr)?;
    writeln!(out, "    called from {}", s.call_site)?;
    writeln!(out, "    name {}", s.provenance)?;
    match &s.verdict {
        Some(e) => writeln!(out, "    verdict: {e}")?,
        None => writeln!(out, "    verdict: ok")?,
    }
    writeln!(out, "    {{")?;
    writeln!(out, "        struct low canary  = {:#X}", s.struct_guard_low)?;
    writeln!(out, "        struct high canary = {:#X}", s.struct_guard_high)?;
    writeln!(out, "        left canary  = {}", fmt_guard(s.buffer_guard_low))?;
    writeln!(out, "        right canary = {}", fmt_guard(s.buffer_guard_high))?;
    writeln!(out, "        capacity = {}", s.capacity)?;
    writeln!(out, "        size     = {}", s.size)?;
    writeln!(out, "        buffer digest = {}", s.buffer_digest)?;
    writeln!(out, "        struct digest = {}", s.struct_digest)?;
    writeln!(out, "        data [{}]", fmt_addr(s.buffer_addr))?;
    writeln!(out, "        {{")?;
    for slot in &s.slots {
        match slot.state {
            SlotState::Live => writeln!(out, "            *[{}] = {}", slot.index, slot.value)?,
            SlotState::Poisoned => {
                writeln!(out, "             [{}] = {} (POISON)", slot.index, slot.value)?
            }
            SlotState::Stale => {
                writeln!(out, "             [{}] = {} (STALE)", slot.index, slot.value)?
            }
        }
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

/// Render the data listing: header, then every element slot, ten to a row.
pub fn render_data(s: &DiagnosticSnapshot) -> String {
    let mut out = String::new();
    let _ = write_data(&mut out, s);
    out
}

fn write_data(out: &mut String, s: &DiagnosticSnapshot) -> std::fmt::Result {
    writeln!(out, "STACK DATA")?;
    writeln!(out)?;
    writeln!(out, "STACK: [{}]", fmt_addr(s.buffer_addr))?;
    writeln!(out, "SIZE: {}", s.size)?;
    writeln!(out, "CAPACITY: {}", s.capacity)?;
    writeln!(out)?;
    for row in s.slots.chunks(ELEMENTS_PER_ROW) {
        write!(out, "[{:>6}]     ", row[0].index)?;
        for slot in row {
            write!(out, "{:<12}", slot.value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

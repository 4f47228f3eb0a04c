//! Point-in-time diagnostic snapshots of a stack.
//!
//! A snapshot is taken when the stack may already be corrupted, so building
//! one trusts nothing: every slot is read through bounds-checked access and
//! the stored digests are copied, not recomputed into the stack.

use serde::Serialize;
use std::fmt;

use crate::canonical::canonical_snapshot_bytes;
use crate::error::IntegrityError;
use crate::hash::Digest32;
use crate::stack::GuardedStack;
use crate::types::{CallSite, Element, Provenance};

/// State of one element slot in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotState {
    /// Below `size`: holds a pushed value.
    Live,
    /// At or above `size` and still holds the poison value.
    Poisoned,
    /// At or above `size` but written since it was poisoned.
    Stale,
}

/// One element slot as observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotEntry {
    /// Element index (0 is the bottom of the stack).
    pub index: usize,
    pub value: Element,
    pub state: SlotState,
}

/// A 32-byte content address for a snapshot: Blake3 of its canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotId(pub [u8; 32]);

impl SnapshotId {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Everything needed to debug a stack after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticSnapshot {
    /// Address of the stack structure.
    pub stack_addr: usize,
    /// Address of the buffer, if there is one.
    pub buffer_addr: Option<usize>,
    pub call_site: CallSite,
    pub provenance: Provenance,
    pub struct_guard_low: u64,
    pub struct_guard_high: u64,
    /// `None` when the guard slot lies outside the buffer.
    pub buffer_guard_low: Option<Element>,
    pub buffer_guard_high: Option<Element>,
    pub capacity: usize,
    pub size: i64,
    /// Digests as stored in the stack.
    pub buffer_digest: Digest32,
    pub struct_digest: Digest32,
    /// Result of validating the stack when the snapshot was taken.
    pub verdict: Option<IntegrityError>,
    /// Element slots `0..capacity` that exist in the buffer.
    pub slots: Vec<SlotEntry>,
}

impl DiagnosticSnapshot {
    /// Capture `stack` as seen from `call_site`.
    pub fn capture(stack: &GuardedStack, call_site: CallSite) -> Self {
        let buffer = stack.raw_buffer();
        let capacity = stack.capacity();
        let size = stack.raw_size();
        let live_end = usize::try_from(size).unwrap_or(0);
        let poison_bits = stack.config().poison.to_bits();
        let (struct_guard_low, struct_guard_high) = stack.struct_guards();

        let slot_at = |index: usize| buffer.and_then(|b| b.get(index)).copied();

        let slots = (0..capacity)
            .map_while(|index| {
                let value = slot_at(index + 1)?;
                let state = if index < live_end {
                    SlotState::Live
                } else if value.to_bits() == poison_bits {
                    SlotState::Poisoned
                } else {
                    SlotState::Stale
                };
                Some(SlotEntry {
                    index,
                    value,
                    state,
                })
            })
            .collect();

        Self {
            stack_addr: stack as *const GuardedStack as usize,
            buffer_addr: buffer.map(|b| b.as_ptr() as usize),
            call_site,
            provenance: *stack.provenance(),
            struct_guard_low,
            struct_guard_high,
            buffer_guard_low: slot_at(0),
            buffer_guard_high: capacity.checked_add(1).and_then(slot_at),
            capacity,
            size,
            buffer_digest: stack.buffer_digest(),
            struct_digest: stack.struct_digest(),
            verdict: stack.validate().err(),
            slots,
        }
    }

    /// Content address of this snapshot (addresses excluded).
    pub fn id(&self) -> SnapshotId {
        SnapshotId(*blake3::hash(&canonical_snapshot_bytes(self)).as_bytes())
    }

    /// Slots below `size`.
    pub fn live(&self) -> impl Iterator<Item = &SlotEntry> {
        self.slots.iter().filter(|s| s.state == SlotState::Live)
    }

    /// Slots at or above `size`, poisoned or stale.
    pub fn released(&self) -> impl Iterator<Item = &SlotEntry> {
        self.slots.iter().filter(|s| s.state != SlotState::Live)
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_none()
    }
}

impl GuardedStack {
    /// Take a diagnostic snapshot. Works on corrupted stacks.
    pub fn snapshot(&self, call_site: CallSite) -> DiagnosticSnapshot {
        DiagnosticSnapshot::capture(self, call_site)
    }
}

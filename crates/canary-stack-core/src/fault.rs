//! Deliberate corruption of a live stack, for exercising the integrity layer.
//!
//! Only compiled with the `fault-injection` feature (and in this crate's own
//! tests). None of these writes touch the digests unless [`FaultInjector::reseal`]
//! is called, so a plain write is exactly what a stray pointer would do.

use crate::config::StackConfig;
use crate::error::GuardSide;
use crate::hash::Digest32;
use crate::stack::GuardedStack;
use crate::types::Element;

/// Write access to the raw fields of a [`GuardedStack`].
pub struct FaultInjector<'a> {
    stack: &'a mut GuardedStack,
}

impl GuardedStack {
    /// Get a fault injector for this stack.
    pub fn fault_injector(&mut self) -> FaultInjector<'_> {
        FaultInjector { stack: self }
    }
}

impl FaultInjector<'_> {
    /// Overwrite a structure canary.
    pub fn set_struct_guard(&mut self, side: GuardSide, value: u64) -> &mut Self {
        match side {
            GuardSide::Low => self.stack.struct_guard_low = value,
            GuardSide::High => self.stack.struct_guard_high = value,
        }
        self
    }

    /// Overwrite a buffer canary slot.
    pub fn set_buffer_guard(&mut self, side: GuardSide, value: Element) -> &mut Self {
        let slot = match side {
            GuardSide::Low => 0,
            GuardSide::High => self.stack.capacity.saturating_add(1),
        };
        self.write_raw(slot, value)
    }

    /// Overwrite a raw buffer slot (0 is the low guard). Out-of-range writes are ignored.
    pub fn write_raw(&mut self, slot: usize, value: Element) -> &mut Self {
        if let Some(e) = self.stack.buffer.as_mut().and_then(|b| b.get_mut(slot)) {
            *e = value;
        }
        self
    }

    /// Overwrite element slot `index` (0 is the bottom of the stack).
    pub fn write_element(&mut self, index: usize, value: Element) -> &mut Self {
        self.write_raw(index + 1, value)
    }

    /// Invert one byte (0..8, little-endian order) of a raw buffer slot.
    pub fn flip_byte(&mut self, slot: usize, byte: usize) -> &mut Self {
        if let Some(e) = self.stack.buffer.as_mut().and_then(|b| b.get_mut(slot)) {
            let mask = 0xffu64 << (8 * (byte % 8));
            *e = Element::from_bits(e.to_bits() ^ mask);
        }
        self
    }

    pub fn set_size(&mut self, size: i64) -> &mut Self {
        self.stack.size = size;
        self
    }

    pub fn set_capacity(&mut self, capacity: usize) -> &mut Self {
        self.stack.capacity = capacity;
        self
    }

    /// Replace the stored configuration, and with it the derived growth policy.
    pub fn set_config(&mut self, config: StackConfig) -> &mut Self {
        self.stack.config = config;
        self
    }

    /// Drop the buffer, leaving the stack without backing storage.
    pub fn drop_buffer(&mut self) -> &mut Self {
        self.stack.buffer = None;
        self
    }

    pub fn set_buffer_digest(&mut self, digest: Digest32) -> &mut Self {
        self.stack.buffer_digest = digest;
        self
    }

    pub fn set_struct_digest(&mut self, digest: Digest32) -> &mut Self {
        self.stack.struct_digest = digest;
        self
    }

    /// Recompute both digests over the current (possibly corrupted) contents.
    pub fn reseal(&mut self) -> &mut Self {
        self.stack.recompute_digests();
        self
    }
}

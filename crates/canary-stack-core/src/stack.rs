//! The guarded stack: a dynamic array bracketed by canaries and digests.
//!
//! Every mutation validates on entry, applies the growth policy, mutates,
//! recomputes both digests and validates again before returning. A failed
//! validation is returned as [`StackError::Corrupted`]; deciding what to do
//! about it (report, abort) is left to the caller.

use crate::canonical::canonical_struct_bytes;
use crate::config::StackConfig;
use crate::error::{IntegrityError, Result, StackError};
use crate::growth::{self, GrowthPolicy, Resize, ResizeKind};
use crate::hash::{murmur3_32, Digest32, Murmur3};
use crate::types::{Element, Provenance};
use crate::validation;

/// Result of a successful pop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popped {
    pub value: Element,
    /// Set when the pop shrank the buffer.
    pub resize: Option<Resize>,
}

/// A growable stack of [`Element`]s that checks its own integrity.
///
/// The buffer holds `capacity + 2` slots: a guard, the element slots, and
/// another guard. Slots at and beyond `size` hold the configured poison.
// repr(C) keeps the structure guards at the two ends of the struct.
#[repr(C)]
pub struct GuardedStack {
    pub(crate) struct_guard_low: u64,
    pub(crate) buffer: Option<Vec<Element>>,
    pub(crate) size: i64,
    pub(crate) capacity: usize,
    provenance: Provenance,
    pub(crate) config: StackConfig,
    pub(crate) buffer_digest: Digest32,
    pub(crate) struct_digest: Digest32,
    pub(crate) struct_guard_high: u64,
}

impl GuardedStack {
    /// Construct an empty stack at the configured initial capacity.
    pub fn new(provenance: Provenance, config: StackConfig) -> Result<Self> {
        config.validate()?;

        let buffer = growth::allocate(
            config.initial_capacity,
            config.sentinel_element(),
            config.poison,
        )?;

        let mut stack = Self {
            struct_guard_low: config.sentinel,
            buffer: Some(buffer),
            size: 0,
            capacity: config.initial_capacity,
            provenance,
            config,
            buffer_digest: Digest32::ZERO,
            struct_digest: Digest32::ZERO,
            struct_guard_high: config.sentinel,
        };
        stack.recompute_digests();
        stack.validate()?;
        Ok(stack)
    }

    /// Push `value`, growing the buffer first if it is full.
    pub fn push(&mut self, value: Element) -> Result<Option<Resize>> {
        self.validate()?;

        let size = self.live_len();
        let resize = self.ensure_capacity_for_push(size)?;

        let buffer = self.buffer.as_mut().ok_or(IntegrityError::InvalidBuffer)?;
        buffer[size + 1] = value;
        self.size += 1;
        self.recompute_digests();

        self.validate()?;
        Ok(resize)
    }

    /// Pop the top element, poisoning its slot and shrinking if eligible.
    ///
    /// An empty stack yields [`StackError::Underflow`] without mutating.
    pub fn pop(&mut self) -> Result<Popped> {
        self.validate()?;

        if self.size == 0 {
            return Err(StackError::Underflow);
        }

        self.size -= 1;
        let slot = self.live_len() + 1;
        let poison = self.config.poison;
        let buffer = self.buffer.as_mut().ok_or(IntegrityError::InvalidBuffer)?;
        let value = std::mem::replace(&mut buffer[slot], poison);
        self.recompute_digests();

        let resize = self.maybe_shrink_after_pop();

        self.validate()?;
        Ok(Popped { value, resize })
    }

    /// Validate, zero-fill and release the buffer.
    pub fn destroy(mut self) -> Result<()> {
        self.validate()?;
        self.scrub();
        self.buffer = None;
        Ok(())
    }

    fn ensure_capacity_for_push(&mut self, size: usize) -> Result<Option<Resize>> {
        let Some(new) = self.policy().grow_target(size, self.capacity)? else {
            return Ok(None);
        };
        let old = self.capacity;
        let (sentinel, poison) = (self.config.sentinel_element(), self.config.poison);

        let buffer = self.buffer.as_mut().ok_or(IntegrityError::InvalidBuffer)?;
        growth::grow(buffer, old, new, sentinel, poison)?;
        self.capacity = new;
        self.recompute_digests();
        self.validate()?;

        Ok(Some(Resize {
            kind: ResizeKind::Grow,
            from: old,
            to: new,
        }))
    }

    fn maybe_shrink_after_pop(&mut self) -> Option<Resize> {
        let new = self.policy().shrink_target(self.live_len(), self.capacity)?;
        let old = self.capacity;
        let sentinel = self.config.sentinel_element();

        let buffer = self.buffer.as_mut()?;
        growth::shrink(buffer, old, new, sentinel);
        self.capacity = new;
        self.recompute_digests();

        Some(Resize {
            kind: ResizeKind::Shrink,
            from: old,
            to: new,
        })
    }

    /// Check all invariants. See [`validation::validate`].
    pub fn validate(&self) -> std::result::Result<(), IntegrityError> {
        validation::validate(self)
    }

    /// Recompute and store both digests. The buffer digest goes first
    /// because the structure digest covers it.
    pub fn recompute_digests(&mut self) {
        self.buffer_digest = self.compute_buffer_digest().unwrap_or(Digest32::ZERO);
        self.struct_digest = self.compute_struct_digest();
    }

    /// Digest of `buffer[0..capacity + 2)`, or `None` if that range does not exist.
    pub fn compute_buffer_digest(&self) -> Option<Digest32> {
        let region = self.buffer.as_deref()?.get(..self.capacity.checked_add(2)?)?;
        let mut hasher = Murmur3::new(self.config.hash_seed);
        for element in region {
            hasher.update(&element.to_le_bytes());
        }
        Some(hasher.finish())
    }

    /// Digest of the canonical structure fields.
    pub fn compute_struct_digest(&self) -> Digest32 {
        murmur3_32(&canonical_struct_bytes(self), self.config.hash_seed)
    }

    /// Zero every slot of the buffer, guards included.
    pub fn scrub(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.fill(0.0);
        }
    }

    /// `size` clamped into `0..=capacity`.
    fn live_len(&self) -> usize {
        usize::try_from(self.size).unwrap_or(0).min(self.capacity)
    }

    /// The live elements, bottom first.
    ///
    /// Never panics: on a corrupted stack this is whatever part of
    /// `1..=size` the buffer actually holds.
    pub fn live(&self) -> &[Element] {
        let Some(buffer) = self.buffer.as_deref() else {
            return &[];
        };
        let end = (self.live_len() + 1).min(buffer.len());
        buffer.get(1..end).unwrap_or(&[])
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.live_len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The stored size counter, unclamped.
    pub fn raw_size(&self) -> i64 {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Growth policy derived from the configuration, which the structure
    /// digest covers.
    pub fn policy(&self) -> GrowthPolicy {
        GrowthPolicy::from_config(&self.config)
    }

    /// The whole buffer including both guard slots.
    pub fn raw_buffer(&self) -> Option<&[Element]> {
        self.buffer.as_deref()
    }

    pub fn struct_guards(&self) -> (u64, u64) {
        (self.struct_guard_low, self.struct_guard_high)
    }

    pub fn buffer_digest(&self) -> Digest32 {
        self.buffer_digest
    }

    pub fn struct_digest(&self) -> Digest32 {
        self.struct_digest
    }
}

impl Drop for GuardedStack {
    fn drop(&mut self) {
        self.scrub();
    }
}

impl std::fmt::Debug for GuardedStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedStack")
            .field("name", &self.provenance.name)
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("buffer_digest", &self.buffer_digest)
            .field("struct_digest", &self.struct_digest)
            .finish_non_exhaustive()
    }
}

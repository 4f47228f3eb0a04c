//! Growth engine: when to resize the buffer and by how much.
//!
//! The policy is independent of integrity checking. It only decides new
//! capacities and reshapes a guarded buffer of `capacity + 2` slots; the
//! caller recomputes digests afterwards.

use serde::Serialize;

use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::types::Element;

/// Direction of a capacity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResizeKind {
    Grow,
    Shrink,
}

/// A capacity change performed by a push or a pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Resize {
    pub kind: ResizeKind,
    pub from: usize,
    pub to: usize,
}

/// Allocation policy derived from a [`StackConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    floor: usize,
    growth_factor: usize,
    reduction_factor: usize,
}

impl GrowthPolicy {
    pub fn from_config(config: &StackConfig) -> Self {
        Self {
            floor: config.initial_capacity,
            growth_factor: config.growth_factor,
            reduction_factor: config.reduction_factor,
        }
    }

    /// The minimum capacity.
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// New capacity for a push at `size`, or `None` if there is room.
    pub fn grow_target(&self, size: usize, capacity: usize) -> Result<Option<usize>> {
        if size < capacity {
            return Ok(None);
        }
        capacity
            .checked_mul(self.growth_factor)
            .filter(|c| c.checked_add(2).is_some())
            .map(Some)
            .ok_or(StackError::CapacityOverflow {
                capacity,
                factor: self.growth_factor,
            })
    }

    /// New capacity after a pop left `size` elements, or `None` to keep it.
    pub fn shrink_target(&self, size: usize, capacity: usize) -> Option<usize> {
        if size == 0 || capacity <= self.floor {
            return None;
        }
        if capacity / size < self.reduction_factor {
            return None;
        }
        Some((capacity / self.reduction_factor).max(self.floor))
    }
}

/// Allocate a guarded buffer: both guards planted, every element slot poisoned.
pub(crate) fn allocate(capacity: usize, sentinel: Element, poison: Element) -> Result<Vec<Element>> {
    let slots = capacity
        .checked_add(2)
        .ok_or(StackError::AllocationFailed { requested: capacity })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(slots)
        .map_err(|_| StackError::AllocationFailed { requested: slots })?;
    buffer.push(sentinel);
    buffer.resize(capacity + 1, poison);
    buffer.push(sentinel);
    Ok(buffer)
}

/// Extend `buffer` from `old` to `new` element slots.
///
/// The old high guard and every newly exposed slot become poison; the high
/// guard is re-planted at the new end. On allocation failure the buffer is
/// left unchanged.
pub(crate) fn grow(
    buffer: &mut Vec<Element>,
    old: usize,
    new: usize,
    sentinel: Element,
    poison: Element,
) -> Result<()> {
    debug_assert!(new > old);
    debug_assert_eq!(buffer.len(), old + 2);

    buffer
        .try_reserve_exact(new - old)
        .map_err(|_| StackError::AllocationFailed { requested: new + 2 })?;
    buffer[old + 1] = poison;
    buffer.resize(new + 1, poison);
    buffer.push(sentinel);
    Ok(())
}

/// Cut `buffer` from `old` to `new` element slots and re-plant the high guard.
pub(crate) fn shrink(buffer: &mut Vec<Element>, old: usize, new: usize, sentinel: Element) {
    debug_assert!(new < old);
    debug_assert_eq!(buffer.len(), old + 2);

    buffer.truncate(new + 1);
    buffer.push(sentinel);
    buffer.shrink_to_fit();
}

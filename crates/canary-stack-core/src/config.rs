//! Stack configuration: sentinels, growth factors and the hash seed.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hash::DEFAULT_SEED;
use crate::types::Element;

/// Canary value planted at both ends of the structure and of the buffer.
pub const DEFAULT_SENTINEL: u64 = 0xDEF_ACED;

/// Marker for allocated slots that hold no live element.
pub const DEFAULT_POISON: Element = 0xBAD_C0DE as Element;

/// Largest integer every value up to which is exactly representable in `f64`.
const MAX_EXACT_ELEMENT_INT: u64 = 1 << 53;

/// Configuration for a guarded stack. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Canary value for structure and buffer guards.
    pub sentinel: u64,
    /// Value written into slots that are allocated but not live.
    pub poison: Element,
    /// Capacity at construction; the stack never shrinks below it.
    pub initial_capacity: usize,
    /// Multiplier applied to capacity when a push finds the stack full.
    pub growth_factor: usize,
    /// Shrink threshold and divisor: shrink when `capacity / size` reaches it.
    pub reduction_factor: usize,
    /// Seed for both digests.
    pub hash_seed: u32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            poison: DEFAULT_POISON,
            initial_capacity: 16,
            growth_factor: 2,
            reduction_factor: 4,
            hash_seed: DEFAULT_SEED,
        }
    }
}

impl StackConfig {
    pub fn with_sentinel(mut self, sentinel: u64) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_poison(mut self, poison: Element) -> Self {
        self.poison = poison;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn with_reduction_factor(mut self, factor: usize) -> Self {
        self.reduction_factor = factor;
        self
    }

    pub fn with_hash_seed(mut self, seed: u32) -> Self {
        self.hash_seed = seed;
        self
    }

    /// The sentinel as it is stored in buffer guard slots.
    pub fn sentinel_element(&self) -> Element {
        self.sentinel as Element
    }

    /// Check that the configuration can produce a valid stack.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.growth_factor < 2 {
            return Err(ConfigError::FactorTooSmall {
                name: "growth_factor",
                value: self.growth_factor,
            });
        }
        if self.reduction_factor < 2 {
            return Err(ConfigError::FactorTooSmall {
                name: "reduction_factor",
                value: self.reduction_factor,
            });
        }
        if self.sentinel == 0 {
            return Err(ConfigError::ZeroSentinel);
        }
        if self.sentinel > MAX_EXACT_ELEMENT_INT {
            return Err(ConfigError::SentinelNotRepresentable(self.sentinel));
        }
        if !self.poison.is_finite() {
            return Err(ConfigError::InvalidPoison(self.poison, "must be finite"));
        }
        if self.poison == 0.0 {
            return Err(ConfigError::InvalidPoison(self.poison, "must differ from zero"));
        }
        if self.poison.to_bits() == self.sentinel_element().to_bits() {
            return Err(ConfigError::InvalidPoison(self.poison, "must differ from the sentinel"));
        }
        Ok(())
    }
}

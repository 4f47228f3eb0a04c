//! Error types for Canary Stack Core.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which end of a guarded region failed its canary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GuardSide {
    Low,
    High,
}

impl fmt::Display for GuardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardSide::Low => f.write_str("low"),
            GuardSide::High => f.write_str("high"),
        }
    }
}

/// A confirmed integrity violation.
///
/// Variants are listed in validation order: when several invariants are
/// broken at once, the earliest variant is the one reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
pub enum IntegrityError {
    #[error("buffer is missing")]
    InvalidBuffer,

    #[error("size is negative")]
    InvalidSize,

    #[error("size exceeds capacity")]
    SizeExceedsCapacity,

    #[error("structure {side} canary overwritten")]
    StructureCorrupted { side: GuardSide },

    #[error("buffer {side} canary overwritten")]
    BufferBoundsViolated { side: GuardSide },

    #[error("buffer digest mismatch")]
    BufferContentCorrupted,

    #[error("structure digest mismatch")]
    StructureFieldsCorrupted,
}

/// Configuration rejected by [`StackConfig::validate`](crate::config::StackConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    #[error("{name} must be at least 2, got {value}")]
    FactorTooSmall { name: &'static str, value: usize },

    #[error("sentinel must be nonzero")]
    ZeroSentinel,

    #[error("sentinel {0:#x} is not exactly representable as an element")]
    SentinelNotRepresentable(u64),

    #[error("poison value {0} is not usable: {1}")]
    InvalidPoison(f64, &'static str),
}

/// Errors returned by stack operations.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("integrity violation: {0}")]
    Corrupted(#[from] IntegrityError),

    #[error("pop from an empty stack")]
    Underflow,

    #[error("allocation of {requested} slots failed")]
    AllocationFailed { requested: usize },

    #[error("capacity {capacity} cannot grow by factor {factor}")]
    CapacityOverflow { capacity: usize, factor: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl StackError {
    /// The integrity violation, if this error is one.
    pub fn integrity(&self) -> Option<IntegrityError> {
        match self {
            StackError::Corrupted(e) => Some(*e),
            _ => None,
        }
    }
}

/// Result type for core stack operations.
pub type Result<T> = std::result::Result<T, StackError>;

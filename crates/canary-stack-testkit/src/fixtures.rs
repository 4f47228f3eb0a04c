//! Test fixtures and helpers.
//!
//! Stacks wired for observation, and a catalogue of the corruptions the
//! integrity layer must catch.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use canary_stack::{
    CanaryStack, Element, GuardSide, IntegrityError, PanicHandler, Provenance, ReportSink,
    StackConfig,
};
use canary_stack_core::Digest32;
use canary_stack_report::MemorySink;

/// A stack reporting into a shared [`MemorySink`].
pub type MemoryStack = CanaryStack<Arc<MemorySink>>;

/// A stack whose snapshots land in memory and whose fatal path panics.
pub struct StackFixture {
    pub stack: MemoryStack,
    pub sink: Arc<MemorySink>,
}

impl StackFixture {
    /// Create an empty stack with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    /// Create an empty stack. Panics if `config` is invalid.
    pub fn with_config(config: StackConfig) -> Self {
        let sink = Arc::new(MemorySink::new());
        let stack = CanaryStack::builder(Provenance::new(
            "fixture",
            file!(),
            line!(),
            "StackFixture::with_config",
        ))
        .config(config)
        .sink(sink.clone())
        .fatal_handler(PanicHandler)
        .build()
        .unwrap();
        Self { stack, sink }
    }

    /// Create a stack holding `100, 200, ..., n * 100`.
    pub fn filled(n: u32) -> Self {
        let mut fixture = Self::new();
        for value in hundreds(n) {
            fixture.stack.push(value).unwrap();
        }
        fixture
    }
}

impl Default for StackFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `100, 200, ..., n * 100`.
pub fn hundreds(n: u32) -> impl Iterator<Item = Element> {
    (1..=n).map(|i| f64::from(i) * 100.0)
}

/// Run `f`, which must take the fatal path (panic under [`PanicHandler`]).
pub fn expect_fatal<R>(f: impl FnOnce() -> R) {
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    assert!(result.is_err(), "operation returned instead of taking the fatal path");
}

/// A way to corrupt a stack, and the violation it must produce.
///
/// Every corruption leaves the digests stale, as a stray write would.
/// Fixtures should hold a few elements and spare capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    StructGuardLow,
    StructGuardHigh,
    BufferGuardLow,
    BufferGuardHigh,
    /// Flip a byte of the bottom element.
    LiveElementFlip,
    /// Flip a byte of the topmost released slot.
    ReleasedSlotFlip,
    /// Increase size by one without touching the buffer.
    SizeBump,
    NegativeSize,
    SizePastCapacity,
    /// Double the capacity without reallocating.
    CapacityBump,
    MissingBuffer,
    BufferDigest,
    StructDigest,
    /// Change the stored growth factor.
    ConfigDrift,
}

impl Corruption {
    pub const ALL: [Corruption; 14] = [
        Corruption::StructGuardLow,
        Corruption::StructGuardHigh,
        Corruption::BufferGuardLow,
        Corruption::BufferGuardHigh,
        Corruption::LiveElementFlip,
        Corruption::ReleasedSlotFlip,
        Corruption::SizeBump,
        Corruption::NegativeSize,
        Corruption::SizePastCapacity,
        Corruption::CapacityBump,
        Corruption::MissingBuffer,
        Corruption::BufferDigest,
        Corruption::StructDigest,
        Corruption::ConfigDrift,
    ];

    /// Corrupt `stack` in place.
    pub fn apply<S: ReportSink>(self, stack: &mut CanaryStack<S>) {
        let capacity = stack.capacity();
        let size = stack.guarded().raw_size();
        let buffer_digest = stack.guarded().buffer_digest().value();
        let struct_digest = stack.guarded().struct_digest().value();
        let config = *stack.config();
        let mut injector = stack.fault_injector();

        match self {
            Corruption::StructGuardLow => injector.set_struct_guard(GuardSide::Low, 0),
            Corruption::StructGuardHigh => injector.set_struct_guard(GuardSide::High, u64::MAX),
            Corruption::BufferGuardLow => injector.set_buffer_guard(GuardSide::Low, 0.0),
            Corruption::BufferGuardHigh => injector.set_buffer_guard(GuardSide::High, -1.0),
            Corruption::LiveElementFlip => injector.flip_byte(1, 0),
            Corruption::ReleasedSlotFlip => injector.flip_byte(capacity, 7),
            Corruption::SizeBump => injector.set_size(size + 1),
            Corruption::NegativeSize => injector.set_size(-1),
            Corruption::SizePastCapacity => {
                injector.set_size(i64::try_from(capacity).unwrap_or(i64::MAX - 1) + 1)
            }
            Corruption::CapacityBump => injector.set_capacity(capacity * 2),
            Corruption::MissingBuffer => injector.drop_buffer(),
            Corruption::BufferDigest => injector.set_buffer_digest(Digest32(buffer_digest ^ 1)),
            Corruption::StructDigest => injector.set_struct_digest(Digest32(struct_digest ^ 1)),
            Corruption::ConfigDrift => {
                injector.set_config(config.with_growth_factor(config.growth_factor * 500))
            }
        };
    }

    /// The violation validation reports after [`apply`](Self::apply).
    pub fn expected(self) -> IntegrityError {
        match self {
            Corruption::StructGuardLow => IntegrityError::StructureCorrupted {
                side: GuardSide::Low,
            },
            Corruption::StructGuardHigh => IntegrityError::StructureCorrupted {
                side: GuardSide::High,
            },
            Corruption::BufferGuardLow => IntegrityError::BufferBoundsViolated {
                side: GuardSide::Low,
            },
            Corruption::BufferGuardHigh | Corruption::CapacityBump => {
                IntegrityError::BufferBoundsViolated {
                    side: GuardSide::High,
                }
            }
            Corruption::LiveElementFlip
            | Corruption::ReleasedSlotFlip
            | Corruption::BufferDigest => IntegrityError::BufferContentCorrupted,
            Corruption::SizeBump | Corruption::StructDigest | Corruption::ConfigDrift => {
                IntegrityError::StructureFieldsCorrupted
            }
            Corruption::NegativeSize => IntegrityError::InvalidSize,
            Corruption::SizePastCapacity => IntegrityError::SizeExceedsCapacity,
            Corruption::MissingBuffer => IntegrityError::InvalidBuffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_fixture() {
        let fixture = StackFixture::filled(3);
        assert_eq!(fixture.stack.inspect(), &[100.0, 200.0, 300.0]);
        assert!(fixture.sink.is_empty());
    }

    #[test]
    fn test_every_corruption_is_classified() {
        for corruption in Corruption::ALL {
            let mut fixture = StackFixture::filled(3);
            corruption.apply(&mut fixture.stack);
            assert_eq!(
                fixture.stack.guarded().validate(),
                Err(corruption.expected()),
                "{corruption:?}"
            );
        }
    }
}

//! Stack validation: canary and digest checks.

use crate::error::{GuardSide, IntegrityError};
use crate::stack::GuardedStack;

/// Validate every invariant of `stack`.
///
/// Checks run in a fixed order and the first failure is returned, so the
/// most fundamental breakage is the one reported:
/// 1. Buffer present
/// 2. Size non-negative
/// 3. Size within capacity
/// 4. Structure canaries (low, then high)
/// 5. Buffer canaries (low, then high)
/// 6. Buffer digest
/// 7. Structure digest
pub fn validate(stack: &GuardedStack) -> Result<(), IntegrityError> {
    // 1. Buffer
    let Some(buffer) = stack.buffer.as_deref() else {
        return Err(IntegrityError::InvalidBuffer);
    };

    // 2-3. Size
    if stack.size < 0 {
        return Err(IntegrityError::InvalidSize);
    }
    if stack.size as u64 > stack.capacity as u64 {
        return Err(IntegrityError::SizeExceedsCapacity);
    }

    // 4. Structure canaries
    let sentinel = stack.config().sentinel;
    if stack.struct_guard_low != sentinel {
        return Err(IntegrityError::StructureCorrupted {
            side: GuardSide::Low,
        });
    }
    if stack.struct_guard_high != sentinel {
        return Err(IntegrityError::StructureCorrupted {
            side: GuardSide::High,
        });
    }

    // 5. Buffer canaries, compared bit for bit
    let guard_bits = stack.config().sentinel_element().to_bits();
    let holds_guard = |index: Option<usize>| {
        index
            .and_then(|i| buffer.get(i))
            .is_some_and(|e| e.to_bits() == guard_bits)
    };
    if !holds_guard(Some(0)) {
        return Err(IntegrityError::BufferBoundsViolated {
            side: GuardSide::Low,
        });
    }
    if !holds_guard(stack.capacity.checked_add(1)) {
        return Err(IntegrityError::BufferBoundsViolated {
            side: GuardSide::High,
        });
    }

    // 6. Buffer digest
    if stack.compute_buffer_digest() != Some(stack.buffer_digest) {
        return Err(IntegrityError::BufferContentCorrupted);
    }

    // 7. Structure digest
    if stack.compute_struct_digest() != stack.struct_digest {
        return Err(IntegrityError::StructureFieldsCorrupted);
    }

    Ok(())
}

//! Proptest generators for property-based testing.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use canary_stack::{CanaryStack, Element, Error, ReportSink, StackConfig};

/// One stack operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Push(Element),
    Pop,
}

/// Generate a finite element.
pub fn element() -> impl Strategy<Value = Element> {
    -1.0e12f64..1.0e12f64
}

/// Generate an operation, biased towards pushes.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => element().prop_map(Op::Push),
        2 => Just(Op::Pop),
    ]
}

/// Generate up to `max_len` operations.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// Generate up to `max_len` elements.
pub fn elements(max_len: usize) -> impl Strategy<Value = Vec<Element>> {
    prop::collection::vec(element(), 0..=max_len)
}

/// Generate a valid configuration with small capacities, so growth and
/// shrinking actually happen.
pub fn config() -> impl Strategy<Value = StackConfig> {
    (1usize..=32, 2usize..=4, 2usize..=8, any::<u32>()).prop_map(
        |(capacity, growth, reduction, seed)| {
            StackConfig::default()
                .with_initial_capacity(capacity)
                .with_growth_factor(growth)
                .with_reduction_factor(reduction)
                .with_hash_seed(seed)
        },
    )
}

/// Apply `ops` to `stack` while tracking a `Vec` model of the contents.
///
/// Fails the case if a pop disagrees with the model, an empty pop is not an
/// underflow, or the stack fails validation after any operation.
pub fn apply_ops<S: ReportSink>(
    stack: &mut CanaryStack<S>,
    ops: &[Op],
) -> Result<Vec<Element>, TestCaseError> {
    let mut model = Vec::new();

    for op in ops {
        match *op {
            Op::Push(value) => {
                stack
                    .push(value)
                    .map_err(|e| TestCaseError::fail(format!("push failed: {e}")))?;
                model.push(value);
            }
            Op::Pop => match (stack.pop(), model.pop()) {
                (Ok(got), Some(expected)) => {
                    prop_assert_eq!(got.to_bits(), expected.to_bits());
                }
                (Err(Error::Underflow), None) => {}
                (got, expected) => {
                    return Err(TestCaseError::fail(format!(
                        "pop returned {got:?}, model expected {expected:?}"
                    )))
                }
            },
        }

        prop_assert_eq!(stack.guarded().validate(), Ok(()));
        prop_assert_eq!(stack.inspect(), model.as_slice());
        prop_assert!(stack.capacity() >= stack.config().initial_capacity);
    }

    Ok(model)
}

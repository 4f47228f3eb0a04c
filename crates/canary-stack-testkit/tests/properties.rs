//! Property tests for the guarded stack.

use proptest::prelude::*;

use canary_stack::{CallSite, Error, GuardSide, IntegrityError, StackConfig, DEFAULT_SENTINEL};
use canary_stack_testkit::fixtures::StackFixture;
use canary_stack_testkit::generators::{apply_ops, config, element, elements, ops};

proptest! {
    #[test]
    fn lifo_round_trip(values in elements(200)) {
        let mut fixture = StackFixture::new();
        for &v in &values {
            fixture.stack.push(v).unwrap();
        }

        for &expected in values.iter().rev() {
            prop_assert_eq!(fixture.stack.pop().unwrap(), expected);
        }
        prop_assert!(matches!(fixture.stack.pop(), Err(Error::Underflow)));
        prop_assert_eq!(fixture.stack.guarded().validate(), Ok(()));
    }

    #[test]
    fn invariants_hold_after_every_operation(cfg in config(), script in ops(300)) {
        let mut fixture = StackFixture::with_config(cfg);
        let model = apply_ops(&mut fixture.stack, &script)?;
        prop_assert_eq!(fixture.stack.len(), model.len());
        prop_assert!(fixture.sink.is_empty());
    }

    #[test]
    fn growth_keeps_values_and_capacity_is_minimal(cfg in config(), values in elements(300)) {
        let mut fixture = StackFixture::with_config(cfg);
        for &v in &values {
            fixture.stack.push(v).unwrap();
        }

        let mut expected_capacity = cfg.initial_capacity;
        while expected_capacity < values.len() {
            expected_capacity *= cfg.growth_factor;
        }

        prop_assert_eq!(fixture.stack.inspect(), values.as_slice());
        prop_assert_eq!(fixture.stack.capacity(), expected_capacity);
        prop_assert_eq!(fixture.stack.stats().shrinks, 0);
    }

    #[test]
    fn capacity_never_drops_below_floor(cfg in config(), pushes in 0usize..200, pops in 0usize..250) {
        let mut fixture = StackFixture::with_config(cfg);
        for i in 0..pushes {
            fixture.stack.push(i as f64).unwrap();
        }
        for _ in 0..pops {
            let _ = fixture.stack.pop();
            prop_assert!(fixture.stack.capacity() >= cfg.initial_capacity);
            prop_assert!(fixture.stack.len() <= fixture.stack.capacity());
        }
    }

    #[test]
    fn flipping_any_live_byte_is_detected(
        values in prop::collection::vec(element(), 1..40),
        index in any::<prop::sample::Index>(),
        byte in 0usize..8,
    ) {
        let mut fixture = StackFixture::new();
        for &v in &values {
            fixture.stack.push(v).unwrap();
        }

        let slot = index.index(values.len()) + 1;
        fixture.stack.fault_injector().flip_byte(slot, byte);

        prop_assert_eq!(
            fixture.stack.guarded().validate(),
            Err(IntegrityError::BufferContentCorrupted)
        );
    }

    #[test]
    fn buffer_guard_overwrite_is_detected(
        values in elements(40),
        value in any::<f64>(),
        high in any::<bool>(),
    ) {
        let sentinel_bits = StackConfig::default().sentinel_element().to_bits();
        prop_assume!(value.to_bits() != sentinel_bits);

        let mut fixture = StackFixture::new();
        for &v in &values {
            fixture.stack.push(v).unwrap();
        }

        let side = if high { GuardSide::High } else { GuardSide::Low };
        fixture.stack.fault_injector().set_buffer_guard(side, value);

        prop_assert_eq!(
            fixture.stack.guarded().validate(),
            Err(IntegrityError::BufferBoundsViolated { side })
        );
    }

    #[test]
    fn struct_guard_overwrite_is_detected(value in any::<u64>(), high in any::<bool>()) {
        prop_assume!(value != DEFAULT_SENTINEL);

        let mut fixture = StackFixture::filled(5);
        let side = if high { GuardSide::High } else { GuardSide::Low };
        fixture.stack.fault_injector().set_struct_guard(side, value);

        prop_assert_eq!(
            fixture.stack.guarded().validate(),
            Err(IntegrityError::StructureCorrupted { side })
        );
    }

    #[test]
    fn snapshot_id_is_deterministic(values in elements(50)) {
        let site = CallSite::new("properties.rs", 1, "dump");
        let mut a = StackFixture::new();
        let mut b = StackFixture::new();
        for &v in &values {
            a.stack.push(v).unwrap();
            b.stack.push(v).unwrap();
        }

        prop_assert_eq!(a.stack.dump_at(site).id(), b.stack.dump_at(site).id());
    }
}

//! End-to-end scenarios: growth, shrinking, the fatal path and the sinks.

use std::sync::Arc;

use ciborium::value::Value;
use tempfile::TempDir;

use canary_stack::{
    canary_stack, CanaryStack, DiagnosticSnapshot, Error, GuardSide, IntegrityError,
    JsonLinesSink, PanicHandler, Provenance, ReportSink, SlotState, StackConfig, TextFileSink,
    TextLayout,
};
use canary_stack_core::canonical_snapshot_bytes;
use canary_stack_report::{FanoutSink, MemorySink, ReportError};
use canary_stack_testkit::fixtures::{expect_fatal, hundreds, Corruption, StackFixture};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn hundreds_to_three_thousand_grows_once() {
    init_tracing();
    let mut fixture = StackFixture::new();
    let mut grew_at = Vec::new();

    for (push, value) in hundreds(30).enumerate() {
        let before = fixture.stack.capacity();
        fixture.stack.push(value).unwrap();
        if fixture.stack.capacity() != before {
            grew_at.push((push + 1, before, fixture.stack.capacity()));
        }
    }

    assert_eq!(grew_at, vec![(17, 16, 32)]);
    assert_eq!(fixture.stack.stats().grows, 1);
    assert_eq!(fixture.stack.pop().unwrap(), 3000.0);
    assert_eq!(fixture.stack.guarded().validate(), Ok(()));
    assert_eq!(fixture.stack.len(), 29);
}

#[test]
fn hundred_pushes_eighty_pops_shrinks() {
    let mut fixture = StackFixture::filled(100);
    assert_eq!(fixture.stack.capacity(), 128);

    for _ in 0..80 {
        fixture.stack.pop().unwrap();
    }

    let expected: Vec<f64> = hundreds(20).collect();
    assert_eq!(fixture.stack.inspect(), expected.as_slice());
    assert_eq!(fixture.stack.capacity(), 32);
    assert_eq!(fixture.stack.stats().shrinks, 1);
    assert_eq!(fixture.stack.guarded().validate(), Ok(()));
}

#[test]
fn draining_returns_to_floor_and_underflows() {
    let mut fixture = StackFixture::filled(70);
    while fixture.stack.pop().is_ok() {}

    assert!(fixture.stack.is_empty());
    assert!(fixture.stack.capacity() >= 16);
    assert!(matches!(fixture.stack.pop(), Err(Error::Underflow)));
    assert_eq!(fixture.stack.stats().underflows, 2);
    assert_eq!(fixture.stack.guarded().validate(), Ok(()));
    assert!(fixture.sink.is_empty());
}

#[test]
fn every_corruption_reports_once_and_scrubs() {
    init_tracing();
    for corruption in Corruption::ALL {
        let mut fixture = StackFixture::filled(3);
        corruption.apply(&mut fixture.stack);

        expect_fatal(|| fixture.stack.push(400.0));

        assert_eq!(fixture.sink.len(), 1, "{corruption:?}");
        let snapshot = fixture.sink.last().unwrap();
        assert_eq!(snapshot.verdict, Some(corruption.expected()), "{corruption:?}");
        assert_eq!(snapshot.call_site.operation, "push");
        assert!(snapshot.call_site.file.ends_with("scenarios.rs"));

        if let Some(buffer) = fixture.stack.guarded().raw_buffer() {
            assert!(buffer.iter().all(|&e| e == 0.0), "{corruption:?} left data behind");
        }
    }
}

#[test]
fn corruption_detected_on_pop_and_check() {
    let mut fixture = StackFixture::filled(3);
    Corruption::BufferGuardHigh.apply(&mut fixture.stack);
    expect_fatal(|| fixture.stack.pop());
    assert_eq!(fixture.sink.last().unwrap().call_site.operation, "pop");

    let mut fixture = StackFixture::filled(3);
    Corruption::SizeBump.apply(&mut fixture.stack);
    expect_fatal(|| fixture.stack.check());
    let snapshot = fixture.sink.last().unwrap();
    assert_eq!(snapshot.call_site.operation, "check");
    assert_eq!(snapshot.verdict, Some(IntegrityError::StructureFieldsCorrupted));
}

#[test]
fn corrupted_snapshot_shows_the_damage() {
    let mut fixture = StackFixture::filled(2);
    fixture
        .stack
        .fault_injector()
        .set_buffer_guard(GuardSide::High, 1.5)
        .write_element(5, 9.0);

    expect_fatal(|| fixture.stack.pop());
    let snapshot = fixture.sink.last().unwrap();

    assert_eq!(snapshot.buffer_guard_high, Some(1.5));
    assert_eq!(snapshot.live().count(), 2);
    assert_eq!(snapshot.slots[5].state, SlotState::Stale);
    assert_eq!(snapshot.slots[6].state, SlotState::Poisoned);
}

struct RefusingSink;

impl ReportSink for RefusingSink {
    fn emit(&self, _snapshot: &DiagnosticSnapshot) -> canary_stack_report::Result<()> {
        Err(ReportError::Serialization("sink offline".into()))
    }
}

#[test]
fn failing_sink_does_not_prevent_fatal_path() {
    init_tracing();
    let memory = Arc::new(MemorySink::new());
    let mut stack = CanaryStack::builder(Provenance::new("stk", file!(), line!(), "test"))
        .sink(FanoutSink::new().with(RefusingSink).with(memory.clone()))
        .fatal_handler(PanicHandler)
        .build()
        .unwrap();
    stack.push(1.0).unwrap();
    Corruption::StructGuardLow.apply(&mut stack);

    expect_fatal(|| stack.push(2.0));
    assert_eq!(memory.len(), 1);
}

#[test]
fn fatal_snapshot_lands_in_json_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots.jsonl");
    let sink = JsonLinesSink::open(&path).unwrap();
    let mut stk = canary_stack!(stk, StackConfig::default(), sink, PanicHandler).unwrap();
    stk.push(100.0).unwrap();
    Corruption::LiveElementFlip.apply(&mut stk);
    expect_fatal(|| stk.pop());

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["verdict"], "BufferContentCorrupted");
    assert_eq!(record["provenance"]["name"], "stk");
    assert_eq!(record["id"].as_str().unwrap().len(), 64);
    assert_eq!(record["call_site"]["operation"], "pop");
}

#[test]
fn text_dump_of_explicit_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.txt");
    let mut stk =
        canary_stack!(stk, StackConfig::default(), TextFileSink::new(&path, TextLayout::Dump))
            .unwrap();
    for value in hundreds(3) {
        stk.push(value).unwrap();
    }
    stk.report().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("verdict: ok"));
    assert!(text.contains("(report)"));
    assert!(text.contains("*[2] = 300"));
    assert!(text.contains("scenarios.rs"));
    stk.destroy().unwrap();
}

#[test]
fn config_from_json_drives_growth() {
    let config: StackConfig =
        serde_json::from_str(r#"{ "initial_capacity": 4, "growth_factor": 3 }"#).unwrap();
    let mut fixture = StackFixture::with_config(config);

    for value in hundreds(5) {
        fixture.stack.push(value).unwrap();
    }
    assert_eq!(fixture.stack.capacity(), 12);
    assert_eq!(fixture.stack.config().reduction_factor, 4);
}

#[test]
fn canonical_snapshot_bytes_decode_without_addresses() {
    let fixture = StackFixture::filled(2);
    let snapshot = fixture.stack.dump();
    let bytes = canonical_snapshot_bytes(&snapshot);

    let value: Value = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    let Value::Map(entries) = value else {
        panic!("snapshot is not a map");
    };
    assert_eq!(entries.len(), 9);

    let addr = Value::Integer((snapshot.stack_addr as u64).into());
    assert!(entries.iter().all(|(_, v)| *v != addr));
}

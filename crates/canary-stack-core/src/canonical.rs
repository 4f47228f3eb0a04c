//! Canonical CBOR encoding of stack fields and snapshots.
//!
//! The structure digest is computed over these bytes rather than over the
//! in-memory layout, so it covers the logical fields only (no padding, no
//! pointer values) and is identical on every platform:
//! - Map keys are small integers, sorted by encoded bytes
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//! - Elements are encoded as their IEEE-754 bit patterns, never as floats

use ciborium::value::Value;

use crate::hash::Digest32;
use crate::snapshot::{DiagnosticSnapshot, SlotState};
use crate::stack::GuardedStack;
use crate::types::{CallSite, Element, Provenance};

/// Structure field keys.
mod keys {
    pub const GUARD_LOW: u64 = 0;
    pub const BUFFER_PRESENT: u64 = 1;
    pub const SIZE: u64 = 2;
    pub const CAPACITY: u64 = 3;
    pub const NAME: u64 = 4;
    pub const FILE: u64 = 5;
    pub const LINE: u64 = 6;
    pub const FUNCTION: u64 = 7;
    pub const BUFFER_DIGEST: u64 = 8;
    pub const STRUCT_DIGEST: u64 = 9;
    pub const GUARD_HIGH: u64 = 10;
    pub const SENTINEL: u64 = 11;
    pub const POISON: u64 = 12;
    pub const INITIAL_CAPACITY: u64 = 13;
    pub const GROWTH_FACTOR: u64 = 14;
    pub const REDUCTION_FACTOR: u64 = 15;
    pub const HASH_SEED: u64 = 16;
}

/// Snapshot field keys.
mod snapshot_keys {
    pub const CALL_SITE: u64 = 0;
    pub const PROVENANCE: u64 = 1;
    pub const STRUCT_GUARDS: u64 = 2;
    pub const BUFFER_GUARDS: u64 = 3;
    pub const CAPACITY: u64 = 4;
    pub const SIZE: u64 = 5;
    pub const DIGESTS: u64 = 6;
    pub const VERDICT: u64 = 7;
    pub const SLOTS: u64 = 8;
}

/// Encode the logical fields of a stack, with the structure digest as zero.
pub fn canonical_struct_bytes(stack: &GuardedStack) -> Vec<u8> {
    let value = struct_to_cbor_value(stack);
    encode_cbor_value_canonical(&value)
}

/// Encode a snapshot. Addresses are left out so the bytes do not depend on
/// where the stack happened to live.
pub fn canonical_snapshot_bytes(snapshot: &DiagnosticSnapshot) -> Vec<u8> {
    let value = snapshot_to_cbor_value(snapshot);
    encode_cbor_value_canonical(&value)
}

fn uint(n: u64) -> Value {
    Value::Integer(n.into())
}

fn int(n: i64) -> Value {
    Value::Integer(n.into())
}

fn element(e: Element) -> Value {
    uint(e.to_bits())
}

fn digest(d: Digest32) -> Value {
    uint(u64::from(d.0))
}

fn struct_to_cbor_value(stack: &GuardedStack) -> Value {
    let provenance = stack.provenance();
    let config = stack.config();
    let entries = vec![
        (uint(keys::GUARD_LOW), uint(stack.struct_guard_low)),
        (uint(keys::BUFFER_PRESENT), Value::Bool(stack.buffer.is_some())),
        (uint(keys::SIZE), int(stack.size)),
        (uint(keys::CAPACITY), uint(stack.capacity as u64)),
        (uint(keys::NAME), Value::Text(provenance.name.to_owned())),
        (uint(keys::FILE), Value::Text(provenance.file.to_owned())),
        (uint(keys::LINE), uint(u64::from(provenance.line))),
        (uint(keys::FUNCTION), Value::Text(provenance.function.to_owned())),
        (uint(keys::BUFFER_DIGEST), digest(stack.buffer_digest)),
        // The digest never covers itself.
        (uint(keys::STRUCT_DIGEST), digest(Digest32::ZERO)),
        (uint(keys::GUARD_HIGH), uint(stack.struct_guard_high)),
        (uint(keys::SENTINEL), uint(config.sentinel)),
        (uint(keys::POISON), element(config.poison)),
        (uint(keys::INITIAL_CAPACITY), uint(config.initial_capacity as u64)),
        (uint(keys::GROWTH_FACTOR), uint(config.growth_factor as u64)),
        (uint(keys::REDUCTION_FACTOR), uint(config.reduction_factor as u64)),
        (uint(keys::HASH_SEED), uint(u64::from(config.hash_seed))),
    ];
    Value::Map(entries)
}

fn call_site_value(site: &CallSite) -> Value {
    Value::Array(vec![
        Value::Text(site.file.to_owned()),
        uint(u64::from(site.line)),
        Value::Text(site.operation.to_owned()),
    ])
}

fn provenance_value(p: &Provenance) -> Value {
    Value::Array(vec![
        Value::Text(p.name.to_owned()),
        Value::Text(p.file.to_owned()),
        uint(u64::from(p.line)),
        Value::Text(p.function.to_owned()),
    ])
}

fn slot_state_code(state: SlotState) -> u64 {
    match state {
        SlotState::Live => 0,
        SlotState::Poisoned => 1,
        SlotState::Stale => 2,
    }
}

fn snapshot_to_cbor_value(s: &DiagnosticSnapshot) -> Value {
    let optional_element = |e: Option<Element>| e.map(element).unwrap_or(Value::Null);

    let verdict = match &s.verdict {
        Some(e) => Value::Text(e.to_string()),
        None => Value::Null,
    };

    let slots = s
        .slots
        .iter()
        .map(|slot| {
            Value::Array(vec![
                uint(slot.index as u64),
                element(slot.value),
                uint(slot_state_code(slot.state)),
            ])
        })
        .collect();

    Value::Map(vec![
        (uint(snapshot_keys::CALL_SITE), call_site_value(&s.call_site)),
        (uint(snapshot_keys::PROVENANCE), provenance_value(&s.provenance)),
        (
            uint(snapshot_keys::STRUCT_GUARDS),
            Value::Array(vec![uint(s.struct_guard_low), uint(s.struct_guard_high)]),
        ),
        (
            uint(snapshot_keys::BUFFER_GUARDS),
            Value::Array(vec![
                optional_element(s.buffer_guard_low),
                optional_element(s.buffer_guard_high),
            ]),
        ),
        (uint(snapshot_keys::CAPACITY), uint(s.capacity as u64)),
        (uint(snapshot_keys::SIZE), int(s.size)),
        (
            uint(snapshot_keys::DIGESTS),
            Value::Array(vec![digest(s.buffer_digest), digest(s.struct_digest)]),
        ),
        (uint(snapshot_keys::VERDICT), verdict),
        (uint(snapshot_keys::SLOTS), Value::Array(slots)),
    ])
}

/// Encode a CBOR Value to canonical bytes.
fn encode_cbor_value_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        _ => unreachable!("value kind is never produced by the canonical encoders"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map canonically (major type 5), keys sorted by encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);

    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

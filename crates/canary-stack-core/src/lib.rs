//! # Canary Stack Core
//!
//! Pure primitives for Canary Stack: a dynamic-array stack that verifies
//! its own structural integrity after every operation.
//!
//! This crate contains no I/O and no logging. It detects corruption and
//! returns it as a value; reporting and aborting live in the `canary-stack`
//! facade.
//!
//! ## Key Types
//!
//! - [`GuardedStack`] - The stack, bracketed by canaries and digests
//! - [`StackConfig`] - Sentinels, growth factors, hash seed
//! - [`IntegrityError`] - The seven kinds of confirmed corruption
//! - [`DiagnosticSnapshot`] - Postmortem view of a (possibly corrupted) stack
//!
//! ## Integrity model
//!
//! Two defense layers: canaries at both ends of the structure and of the
//! buffer catch out-of-bounds writes, and MurmurHash3 digests of the buffer
//! and of the canonical structure fields catch in-bounds tampering. See
//! [`validation`] for the check order.

pub mod canonical;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "fault-injection"))]
pub mod fault;
pub mod growth;
pub mod hash;
pub mod snapshot;
pub mod stack;
pub mod types;
pub mod validation;

pub use canonical::{canonical_snapshot_bytes, canonical_struct_bytes};
pub use config::{StackConfig, DEFAULT_POISON, DEFAULT_SENTINEL};
pub use error::{ConfigError, GuardSide, IntegrityError, StackError};
#[cfg(any(test, feature = "fault-injection"))]
pub use fault::FaultInjector;
pub use growth::{GrowthPolicy, Resize, ResizeKind};
pub use hash::{murmur3_32, Digest32, Murmur3, DEFAULT_SEED};
pub use snapshot::{DiagnosticSnapshot, SlotEntry, SlotState, SnapshotId};
pub use stack::{GuardedStack, Popped};
pub use types::{CallSite, Element, Provenance};
pub use validation::validate;

//! # Canary Stack Testkit
//!
//! Testing utilities for Canary Stack.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: MurmurHash3 inputs with known digests
//! - **Generators**: Proptest strategies for elements, operation sequences and configs
//! - **Fixtures**: Stacks wired to a [`MemorySink`](canary_stack::MemorySink) and a
//!   panicking fatal handler, plus a catalogue of corruptions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use canary_stack_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{name}: got {hex}");
//! }
//! ```
//!
//! ## Corruption Fixtures
//!
//! ```rust
//! use canary_stack_testkit::fixtures::{Corruption, StackFixture};
//!
//! for corruption in Corruption::ALL {
//!     let mut fixture = StackFixture::filled(3);
//!     corruption.apply(&mut fixture.stack);
//!     assert_eq!(fixture.stack.guarded().validate(), Err(corruption.expected()));
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{expect_fatal, Corruption, StackFixture};
pub use generators::{apply_ops, Op};
pub use vectors::{all_vectors, verify_all_vectors, HashVector};

//! Fugata End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the generation pipeline:
//!
//! - Scenarios: spec -> score -> SMF/report files
//! - Universal invariants: structural checks over many `(form, seed)` pairs
//! - Determinism: byte-identical output across runs
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fugata-tests
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{verify_bytes_determinism, verify_hash_determinism, DeterminismResult};
pub use fixtures::{
    chaconne_spec, fantasia_spec, fugue_spec, goldberg_spec, passacaglia_spec, prelude_spec,
    toccata_spec, write_spec_file, SpecDir,
};

//! Fugata Generation Engine - Deterministic Multi-Voice Baroque Scores
//!
//! This crate turns a [`fugata_spec::ScoreSpec`] into a validated polyphonic
//! score: per-voice note tracks, a tempo map, and structural metadata
//! (section layout, tonal plan, cadence plan).
//!
//! # Determinism
//!
//! All operations in this crate are fully deterministic. Given the same
//! spec and seed, the output is byte-identical. This is achieved through:
//!
//! - PCG32 random number generators, one per subsystem, seeded via BLAKE3
//!   derivation of `(seed, subsystem salt)`
//! - Strictly ordered, single-threaded constraint passes
//! - Static formula and template tables
//!
//! # Pipeline
//!
//! Every form pipeline follows the same skeleton: structural material,
//! then planning (tonal plan, section layout, cadence plan), then
//! per-section note generation, then the constraint passes in fixed
//! order (leap resolution, repeated-note repair, vertical safety,
//! cadential coverage, cadence approach), then the instrument
//! impossibility guard, then the tempo map.
//!
//! # Module Structure
//!
//! - [`types`]: Ticks, note events, provenance, protection levels, tracks
//! - [`harmony`]: Chords, harmonic timeline, cadences, chord voicing
//! - [`tonal`]: Modulation planning and timeline expansion
//! - [`structure`]: Form-specific section layouts and variation plans
//! - [`figuration`]: Beat-level figuration templates and non-chord tones
//! - [`subject`]: Subject, answer, countersubject, exposition scheduling
//! - [`passes`]: The ordered constraint-and-repair passes
//! - [`guard`]: Instrument-specific range and simultaneity repair
//! - [`forms`]: The per-form generation pipelines and the public entry point
//! - [`tempo`]: Tempo map construction
//! - [`analysis`]: Read-only quality metrics

pub mod analysis;
pub mod figuration;
pub mod forms;
pub mod guard;
pub mod harmony;
pub mod passes;
pub mod rng;
pub mod structure;
pub mod subject;
pub mod tempo;
pub mod tonal;
pub mod types;

pub use forms::{generate, GenerateError, GenerateResult, Score};
pub use types::{
    NoteEvent, NoteSource, ProtectionLevel, Tick, Track, BEATS_PER_BAR, TICKS_PER_BAR,
    TICKS_PER_BEAT,
};

/// Crate version for engine identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine identifier for reports and cache keys.
pub const ENGINE_ID: &str = "fugata-engine";

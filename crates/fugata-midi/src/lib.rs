//! Fugata MIDI Export
//!
//! Turns a finished [`fugata_engine::Score`] into a Standard MIDI File
//! (format 1: one meta track carrying the tempo map, one track per
//! voice) or a JSON dump for tooling. Both outputs are deterministic;
//! the BLAKE3 hash of the SMF bytes doubles as a determinism check.

pub mod json;
pub mod smf;

pub use json::{dump_score, ScoreDump};
pub use smf::{bytes_hash, score_hash, score_to_bytes, write_score, SmfError, DIVISION};

//! Constraint-and-repair passes.
//!
//! Each pass takes the full note list by mutable reference plus a
//! read-only view of the harmonic timeline, honors the protection
//! contract, and records a [`ModifiedBy`](crate::types::ModifiedBy)
//! flag on every note it alters. Passes never fail; they skip what
//! they cannot safely touch. The pipeline wires them in a fixed
//! order: leap, repeated-note, vertical safety, cadential coverage,
//! cadence approach.

mod cadence_approach;
mod cadence_insert;
mod leap;
mod repeated;
mod vertical;

#[cfg(test)]
mod tests;

pub use cadence_approach::{approach_name, shape_cadence_approaches};
pub use cadence_insert::{insert_cadential_coverage, CoverageOptions};
pub use leap::{resolve_leaps, DEFAULT_LEAP_THRESHOLD};
pub use repeated::{repair_repeated_notes, DEFAULT_MAX_CONSECUTIVE, DEFAULT_RUN_GAP};
pub use vertical::{enforce_vertical_safety, is_vertically_safe};

use crate::types::{NoteEvent, Tick};

/// Sort the buffer into pass order: voice, then start tick.
pub fn sort_for_passes(notes: &mut [NoteEvent]) {
    notes.sort_by_key(|n| (n.voice, n.start_tick, n.pitch));
}

/// Indices of one voice's notes in pass order. The buffer must
/// already be sorted with [`sort_for_passes`].
pub(crate) fn voice_indices(notes: &[NoteEvent], voice: u8) -> Vec<usize> {
    notes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.voice == voice)
        .map(|(i, _)| i)
        .collect()
}

/// Highest voice number present, if any.
pub(crate) fn max_voice(notes: &[NoteEvent]) -> Option<u8> {
    notes.iter().map(|n| n.voice).max()
}

/// The note of `voice` sounding at `tick`, with its predecessor.
pub(crate) fn sounding_with_prev(
    notes: &[NoteEvent],
    voice: u8,
    tick: Tick,
    exclude: usize,
) -> Option<(usize, Option<usize>)> {
    let mut sounding: Option<usize> = None;
    let mut prev: Option<usize> = None;
    for (i, n) in notes.iter().enumerate() {
        if i == exclude || n.voice != voice {
            continue;
        }
        if n.sounds_at(tick) {
            sounding = Some(i);
        } else if n.end_tick() <= tick {
            match prev {
                Some(p) if notes[p].end_tick() >= n.end_tick() => {}
                _ => prev = Some(i),
            }
        }
    }
    sounding.map(|s| (s, prev))
}

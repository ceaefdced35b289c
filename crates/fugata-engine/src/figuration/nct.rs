//! Non-chord-tone injection post-pass.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::harmony::HarmonicTimeline;
use crate::types::{NoteEvent, NoteSource, TICKS_PER_BEAT};

/// Inject passing and neighbor tones into figuration output.
///
/// Only notes at non-beat-start positions that currently sound an
/// explicit chord tone are eligible. A passing tone needs
/// same-direction stepwise approach and departure with the surrounding
/// interval in 3-12 semitones; a neighbor tone needs a surrounding note
/// within a step. Either failing falls through to the original chord
/// tone. `section_progress` in 0.0-1.0 biases neighbor direction:
/// opening and closing favor lower neighbors, the middle alternates by
/// note index. Returns the number of notes altered.
pub fn inject_non_chord_tones(
    notes: &mut [NoteEvent],
    timeline: &HarmonicTimeline,
    probability: f64,
    section_progress: f64,
    rng: &mut Pcg32,
) -> usize {
    let mut modified = 0;

    for i in 0..notes.len() {
        let note = notes[i];
        if note.start_tick % TICKS_PER_BEAT == 0 {
            continue;
        }
        if note.source != NoteSource::PreludeFiguration {
            continue;
        }
        let event = timeline.get_at(note.start_tick);
        if !event.chord.contains(note.pitch, event.key) {
            continue;
        }
        if !rng.gen_bool(probability.clamp(0.0, 1.0)) {
            continue;
        }

        // Same-voice neighbors in sequence order.
        let prev = notes[..i]
            .iter()
            .rev()
            .find(|n| n.voice == note.voice)
            .copied();
        let next = notes[i + 1..].iter().find(|n| n.voice == note.voice).copied();

        let key = event.key;
        let replacement = try_passing(prev, next, key)
            .or_else(|| try_neighbor(&note, i, prev, next, key, section_progress));

        if let Some(pitch) = replacement {
            if pitch != note.pitch {
                notes[i].pitch = pitch;
                notes[i].source = NoteSource::ChromaticPassing;
                modified += 1;
            }
        }
    }
    modified
}

/// Passing tone between prev and next: same-direction steps, the gap
/// between the surrounding notes in 3-12 semitones.
fn try_passing(
    prev: Option<NoteEvent>,
    next: Option<NoteEvent>,
    key: crate::types::Key,
) -> Option<u8> {
    let prev = prev?;
    let next = next?;
    let outer = next.pitch as i16 - prev.pitch as i16;
    if !(3..=12).contains(&outer.abs()) {
        return None;
    }
    let dir: i8 = if outer > 0 { 1 } else { -1 };
    let candidate = key.nearest_scale_tone(prev.pitch, dir);
    // Approach and departure must both be steps within a minor third,
    // same direction.
    let approach = candidate as i16 - prev.pitch as i16;
    let departure = next.pitch as i16 - candidate as i16;
    if approach.abs() > 3 || departure.abs() > 3 {
        return None;
    }
    if approach.signum() != dir as i16 || departure.signum() != dir as i16 {
        return None;
    }
    Some(candidate)
}

/// Neighbor tone: a surrounding note within a whole step of the
/// original pitch.
fn try_neighbor(
    note: &NoteEvent,
    index: usize,
    prev: Option<NoteEvent>,
    next: Option<NoteEvent>,
    key: crate::types::Key,
    section_progress: f64,
) -> Option<u8> {
    let anchor = prev.or(next)?;
    if (anchor.pitch as i16 - note.pitch as i16).abs() > 2 {
        return None;
    }
    let dir: i8 = if section_progress < 0.25 || section_progress > 0.75 {
        -1
    } else if index % 2 == 0 {
        -1
    } else {
        1
    };
    let candidate = key.nearest_scale_tone(note.pitch, dir);
    ((candidate as i16 - note.pitch as i16).abs() <= 2).then_some(candidate)
}

//! Vertical safety.
//!
//! A point check used by the other passes plus a sweep that nudges
//! unsafe flexible notes. The rules: no fresh parallel perfect fifth
//! or octave approached in similar motion, no tritone against the
//! bass outside dominant-seventh harmony, no similar-motion octave
//! between the outer voices on a strong beat.

use crate::harmony::HarmonicTimeline;
use crate::types::{is_strong_beat, ModifiedBy, NoteEvent};

use super::{max_voice, sort_for_passes, sounding_with_prev, voice_indices};

fn pc_interval(a: u8, b: u8) -> u8 {
    (i16::from(a) - i16::from(b)).unsigned_abs() as u8 % 12
}

/// Would placing `candidate` for note `idx` (in `voice`) be safe
/// against every other voice sounding at that note's start tick?
pub fn is_vertically_safe(
    notes: &[NoteEvent],
    voice: u8,
    idx: usize,
    candidate: u8,
    timeline: &HarmonicTimeline,
) -> bool {
    let tick = notes[idx].start_tick;
    let Some(top) = max_voice(notes) else {
        return true;
    };

    // Our own predecessor, for motion direction.
    let own_prev = notes
        .iter()
        .enumerate()
        .filter(|(i, n)| *i != idx && n.voice == voice && n.end_tick() <= tick)
        .max_by_key(|(_, n)| n.end_tick())
        .map(|(_, n)| n.pitch);

    // Bass = lowest sounding pitch among the other voices.
    let bass = notes
        .iter()
        .enumerate()
        .filter(|(i, n)| *i != idx && n.sounds_at(tick))
        .map(|(_, n)| n.pitch)
        .min();

    for other in 0..=top {
        if other == voice {
            continue;
        }
        let Some((s, prev)) = sounding_with_prev(notes, other, tick, idx) else {
            continue;
        };
        let other_pitch = notes[s].pitch;
        let iv = pc_interval(candidate, other_pitch);

        let similar_motion = match (own_prev, prev.map(|p| notes[p].pitch)) {
            (Some(op), Some(pp)) => {
                let own_move = i16::from(candidate) - i16::from(op);
                let other_move = i16::from(other_pitch) - i16::from(pp);
                own_move != 0 && other_move != 0 && own_move.signum() == other_move.signum()
            }
            _ => false,
        };

        // Parallel perfect fifth or octave.
        if (iv == 0 || iv == 7) && similar_motion {
            if let (Some(op), Some(pp)) = (own_prev, prev.map(|p| notes[p].pitch)) {
                if pc_interval(op, pp) == iv {
                    return false;
                }
            }
        }

        // Similar-motion octave between outer voices on a strong beat.
        let outer_pair = (voice == 0 && other == top) || (voice == top && other == 0);
        if outer_pair && iv == 0 && similar_motion && is_strong_beat(tick) {
            return false;
        }
    }

    // Tritone against the bass, unless the harmony is a seventh chord
    // that owns the tritone.
    if let Some(bass_pitch) = bass {
        if candidate > bass_pitch && pc_interval(candidate, bass_pitch) == 6 {
            let event = timeline.get_at(tick);
            let owned = event.chord.quality.is_seventh()
                && event.chord.contains(candidate, event.key)
                && event.chord.contains(bass_pitch, event.key);
            if !owned {
                return false;
            }
        }
    }

    true
}

/// Sweep all flexible notes and nudge unsafe ones onto the nearest
/// safe scale tone. Returns the number of notes modified.
pub fn enforce_vertical_safety(notes: &mut [NoteEvent], timeline: &HarmonicTimeline) -> usize {
    sort_for_passes(notes);
    let mut modified = 0usize;
    let Some(top) = max_voice(notes) else {
        return 0;
    };

    for voice in 0..=top {
        for i in voice_indices(notes, voice) {
            if !notes[i].protection().allows_pitch_change() {
                continue;
            }
            let pitch = notes[i].pitch;
            if is_vertically_safe(notes, voice, i, pitch, timeline) {
                continue;
            }
            let key = timeline.key_at(notes[i].start_tick);
            let repaired = [-1i16, 1, -2, 2]
                .into_iter()
                .map(|d| i16::from(pitch) + d)
                .filter(|p| (0..=127).contains(p))
                .map(|p| p as u8)
                .find(|&p| key.contains(p) && is_vertically_safe(notes, voice, i, p, timeline));
            if let Some(p) = repaired {
                notes[i].pitch = p;
                notes[i].modified_by.insert(ModifiedBy::PARALLEL_REPAIR);
                modified += 1;
            }
        }
    }
    modified
}

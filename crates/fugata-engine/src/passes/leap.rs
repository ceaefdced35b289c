//! Leap resolver.
//!
//! Scans each voice in `(n0, n1, n2)` triplets and pulls the note
//! after a leap back toward the leap by a contrary scale step. A
//! battery of protection conditions keeps the pass away from notes
//! that are already resolved, structurally placed, or part of a
//! recognizable pattern.

use crate::harmony::HarmonicTimeline;
use crate::types::{
    bar_of, is_strong_beat, ModifiedBy, NoteEvent, Tick, VoiceRange, TICKS_PER_BAR,
};

use super::{max_voice, sort_for_passes, voice_indices};
use crate::harmony::ChordDegree;

/// Default leap threshold: a perfect fourth and wider.
pub const DEFAULT_LEAP_THRESHOLD: u8 = 5;

fn interval(a: u8, b: u8) -> u8 {
    (i16::from(a) - i16::from(b)).unsigned_abs() as u8
}

fn is_step(a: u8, b: u8) -> bool {
    let iv = interval(a, b);
    iv >= 1 && iv <= 2
}

/// Whether `p2` is a conventional tendency-tone resolution of `p1`.
fn is_tendency_resolution(timeline: &HarmonicTimeline, tick: Tick, p1: u8, p2: u8) -> bool {
    let key = timeline.key_at(tick);
    // Leading tone rising a semitone to the tonic.
    if p1 % 12 == key.leading_tone_pc() && p2 == p1.saturating_add(1) && p2 % 12 == key.tonic {
        return true;
    }
    // Fa falling a semitone to mi.
    if p1 % 12 == key.subdominant_pc() && p1 > 0 && p2 == p1 - 1 {
        return true;
    }
    // Seventh degree falling by step to the sixth.
    if key.degree_of(p1) == Some(6) && p2 < p1 && is_step(p1, p2) {
        return true;
    }
    false
}

/// Resolve post-leap notes across all voices. Returns the number of
/// notes modified.
pub fn resolve_leaps(
    notes: &mut [NoteEvent],
    timeline: &HarmonicTimeline,
    registers: &[VoiceRange],
    threshold: u8,
) -> usize {
    sort_for_passes(notes);
    let mut modified = 0usize;
    let Some(top) = max_voice(notes) else {
        return 0;
    };

    for voice in 0..=top {
        let idx = voice_indices(notes, voice);
        if idx.len() < 3 {
            continue;
        }
        for w in 0..idx.len() - 2 {
            let (i0, i1, i2) = (idx[w], idx[w + 1], idx[w + 2]);
            let (p0, p1) = (notes[i0].pitch, notes[i1].pitch);
            let p2 = notes[i2].pitch;
            if interval(p1, p0) < threshold {
                continue;
            }
            let leap_up = p1 > p0;
            let n2_tick = notes[i2].start_tick;
            let event = timeline.get_at(n2_tick);

            // -- protection conditions --

            if !notes[i2].protection().allows_pitch_change() {
                continue;
            }
            if notes[i2].modified_by.contains(ModifiedBy::LEAP_RESOLUTION) {
                continue;
            }
            // Bar-line crossing into tonic harmony is a phrase seam;
            // an empty timeline reads as tonic everywhere, which also
            // makes this skip.
            if bar_of(notes[i1].start_tick) != bar_of(n2_tick) {
                let bar_start = n2_tick - n2_tick % TICKS_PER_BAR;
                if timeline.get_at(bar_start).chord.degree == ChordDegree::I {
                    continue;
                }
            }
            let key = event.key;
            let chord_tone = event.chord.contains(p2, key);
            if is_strong_beat(n2_tick) {
                let exception =
                    p2 % 12 == key.leading_tone_pc() && interval(p1, p0) >= 7;
                if !exception {
                    continue;
                }
            }
            // Already resolved: contrary step onto solid ground.
            let contrary_step = is_step(p1, p2) && (p2 > p1) != leap_up;
            if contrary_step && (chord_tone || is_tendency_resolution(timeline, n2_tick, p1, p2)) {
                continue;
            }
            if chord_tone {
                continue;
            }
            // Scalar run after the leap.
            if w + 4 < idx.len() {
                let p3 = notes[idx[w + 3]].pitch;
                let p4 = notes[idx[w + 4]].pitch;
                let s1 = i16::from(p3) - i16::from(p2);
                let s2 = i16::from(p4) - i16::from(p3);
                if s1 != 0
                    && s1.signum() == s2.signum()
                    && s1.abs() <= 2
                    && s2.abs() <= 2
                {
                    continue;
                }
                // Sequence pattern over the five-note window.
                let i_0 = i16::from(p1) - i16::from(p0);
                let i_1 = i16::from(p2) - i16::from(p1);
                if i_0 == s1 && i_1 == s2 {
                    continue;
                }
            }

            // -- candidate search --

            let dir: i16 = if leap_up { -1 } else { 1 };
            let anchor = is_strong_beat(n2_tick) && chord_tone;
            let range = registers.get(voice as usize);
            let mut chosen: Option<u8> = None;
            let mut fallback: Option<u8> = None;
            for offset in [1i16, 2] {
                let candidate = i16::from(p1) + dir * offset;
                if !(0..=127).contains(&candidate) {
                    continue;
                }
                let candidate = candidate as u8;
                if !key.contains(candidate) {
                    continue;
                }
                if let Some(r) = range {
                    if !r.contains(candidate) {
                        continue;
                    }
                }
                if !super::is_vertically_safe(notes, voice, i2, candidate, timeline) {
                    continue;
                }
                // Lookahead: a candidate must not open a fresh
                // unresolved leap toward n3.
                if !anchor {
                    if let Some(&i3) = idx.get(w + 3) {
                        let p3 = notes[i3].pitch;
                        if interval(p3, candidate) >= threshold {
                            let resolves = idx.get(w + 4).is_some_and(|&i4| {
                                let p4 = notes[i4].pitch;
                                is_step(p3, p4) && (p4 > p3) != (p3 > candidate)
                            });
                            if !resolves {
                                continue;
                            }
                        }
                    }
                }
                if event.chord.contains(candidate, key) {
                    chosen = Some(candidate);
                    break;
                }
                if fallback.is_none() {
                    fallback = Some(candidate);
                }
            }

            if let Some(candidate) = chosen.or(fallback) {
                if candidate != p2 {
                    notes[i2].pitch = candidate;
                    notes[i2].modified_by.insert(ModifiedBy::LEAP_RESOLUTION);
                    modified += 1;
                }
            }
        }
    }
    modified
}

//! Chord voicing and voice-leading smoothing.
//!
//! Voicings are pitch lists in voice order: index 0 is the soprano and
//! pitches never ascend with increasing index (no crossing at chord
//! placement).

use crate::types::{Key, VoiceRange};

use super::chord::Chord;
use super::event::HarmonicEvent;

/// One pitch per voice, soprano first, descending or equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordVoicing {
    pub pitches: Vec<u8>,
}

impl ChordVoicing {
    /// Bass pitch (lowest voice).
    pub fn bass(&self) -> Option<u8> {
        self.pitches.last().copied()
    }

    /// Soprano pitch (top voice).
    pub fn soprano(&self) -> Option<u8> {
        self.pitches.first().copied()
    }

    /// Restore the descending-order invariant after per-voice edits.
    fn resort(&mut self) {
        self.pitches.sort_unstable_by(|a, b| b.cmp(a));
    }
}

/// Nearest placement of a pitch class to a reference pitch, clamped to
/// a register.
fn place_pc_near(pc: u8, reference: u8, range: &VoiceRange) -> u8 {
    let mut best = range.clamp(reference);
    let mut best_dist = i16::MAX;
    let mut octave_base = pc as i16;
    while octave_base <= 127 {
        let p = octave_base;
        if p >= range.low as i16 && p <= range.high as i16 {
            let dist = (p - reference as i16).abs();
            if dist < best_dist {
                best_dist = dist;
                best = p as u8;
            }
        }
        octave_base += 12;
    }
    best
}

/// Count how many voices already sound each chord pitch class.
fn doubling_counts(pitches: &[u8], pcs: &[u8]) -> Vec<usize> {
    pcs.iter()
        .map(|pc| pitches.iter().filter(|p| *p % 12 == *pc).count())
        .collect()
}

/// Pick the chord pitch class to give the next inner voice.
///
/// Doubling preference: root over fifth over third; the leading tone
/// and a diminished fifth are never doubled; sevenths of seventh chords
/// are not doubled.
fn choose_pc_for_voice(
    chord: &Chord,
    key: Key,
    already_placed: &[u8],
) -> u8 {
    let pcs = chord.pitch_classes(key);
    let counts = doubling_counts(already_placed, &pcs);
    let leading = key.leading_tone_pc();
    let dim_fifth = chord
        .fifth_pc(key)
        .filter(|_| chord.quality.is_diminished());
    let seventh = chord.seventh_pc(key);

    // Uncovered members first, root-to-seventh order.
    for (pc, count) in pcs.iter().zip(&counts) {
        if *count == 0 {
            return *pc;
        }
    }

    // All members covered: double by preference, skipping forbidden
    // classes.
    let preference = [
        Some(pcs[0]),
        pcs.get(2).copied(),
        pcs.get(1).copied(),
    ];
    for candidate in preference.into_iter().flatten() {
        if candidate == leading {
            continue;
        }
        if Some(candidate) == dim_fifth {
            continue;
        }
        if Some(candidate) == seventh {
            continue;
        }
        return candidate;
    }
    pcs[0]
}

/// Place a chord across `num_voices` voices.
///
/// The bass takes the event's `bass_pitch` class nearest the bass
/// register's center; the soprano takes the chord tone nearest the top
/// register's center; inner voices fill interpolated targets under the
/// doubling rules.
pub fn voice_chord(
    event: &HarmonicEvent,
    num_voices: u8,
    registers: &[VoiceRange],
) -> ChordVoicing {
    let n = num_voices as usize;
    if n == 0 || registers.len() < n {
        return ChordVoicing { pitches: vec![] };
    }
    let key = event.key;
    let chord = event.chord;
    let pcs = chord.pitch_classes(key);

    let bass_range = &registers[n - 1];
    let bass = place_pc_near(event.bass_pitch % 12, bass_range.center(), bass_range);

    if n == 1 {
        return ChordVoicing { pitches: vec![bass] };
    }

    let top_range = &registers[0];
    let soprano = pcs
        .iter()
        .map(|pc| place_pc_near(*pc, top_range.center(), top_range))
        .min_by_key(|p| (*p as i16 - top_range.center() as i16).abs())
        .unwrap_or(top_range.center());

    let mut pitches = vec![soprano];
    let mut placed = vec![bass, soprano];

    // Inner voices aim at pitches interpolated between soprano and bass.
    for voice in 1..n - 1 {
        let t = voice as f64 / (n - 1) as f64;
        let target = soprano as f64 + (bass as f64 - soprano as f64) * t;
        let pc = choose_pc_for_voice(&chord, key, &placed);
        let range = &registers[voice];
        let mut pitch = place_pc_near(pc, target.round() as u8, range);
        // Keep the descending-order invariant against the voice above.
        let above = *pitches.last().unwrap();
        if pitch > above {
            pitch = if pitch >= 12 { pitch - 12 } else { pitch };
        }
        let pitch = pitch.min(above);
        pitches.push(pitch);
        placed.push(pitch);
    }

    pitches.push(bass.min(*pitches.last().unwrap()));
    ChordVoicing { pitches }
}

/// Direction of motion between two pitches.
fn direction(from: u8, to: u8) -> i8 {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

/// Whether two voice pairs move in parallel perfect fifths or octaves
/// with same-direction motion.
fn is_parallel_perfect(prev_a: u8, prev_b: u8, next_a: u8, next_b: u8) -> bool {
    let prev_interval = (prev_a as i16 - prev_b as i16).unsigned_abs() % 12;
    let next_interval = (next_a as i16 - next_b as i16).unsigned_abs() % 12;
    if !(next_interval == 7 || next_interval == 0) {
        return false;
    }
    if prev_interval != next_interval {
        return false;
    }
    let dir_a = direction(prev_a, next_a);
    let dir_b = direction(prev_b, next_b);
    dir_a != 0 && dir_a == dir_b
}

/// Scan a candidate voicing against its predecessor for new parallel
/// perfects. Returns the first offending upper-voice index.
fn find_parallel(prev: &ChordVoicing, next: &[u8]) -> Option<usize> {
    let n = prev.pitches.len().min(next.len());
    for a in 0..n {
        for b in (a + 1)..n {
            if is_parallel_perfect(prev.pitches[a], prev.pitches[b], next[a], next[b]) {
                return Some(a);
            }
        }
    }
    None
}

/// Move each voice to the nearest chord tone of the next event.
///
/// The bass moves to the nearest placement of the event's bass pitch
/// class; a previous leading tone prefers resolving to the tonic.
/// Parallel perfect fifths and octaves get a nearest-chord-tone
/// substitution on the upper voice, reverted if the substitution
/// creates a new parallel. The result is re-sorted to restore the
/// descending-order invariant.
pub fn smooth_voice_leading(
    prev: &ChordVoicing,
    next_event: &HarmonicEvent,
    num_voices: u8,
    registers: &[VoiceRange],
) -> ChordVoicing {
    let n = num_voices as usize;
    if prev.pitches.len() != n || registers.len() < n || n == 0 {
        return voice_chord(next_event, num_voices, registers);
    }
    let key = next_event.key;
    let chord = next_event.chord;
    let pcs = chord.pitch_classes(key);
    let leading = key.leading_tone_pc();

    let mut next: Vec<u8> = Vec::with_capacity(n);
    for voice in 0..n {
        let range = &registers[voice];
        let prev_pitch = prev.pitches[voice];
        let pitch = if voice == n - 1 {
            place_pc_near(next_event.bass_pitch % 12, prev_pitch, range)
        } else if prev_pitch % 12 == leading && pcs.contains(&key.tonic) {
            // Leading tone resolves up a semitone to the tonic when the
            // next chord offers one.
            place_pc_near(key.tonic, prev_pitch + 1, range)
        } else {
            pcs.iter()
                .map(|pc| place_pc_near(*pc, prev_pitch, range))
                .min_by_key(|p| (*p as i16 - prev_pitch as i16).abs())
                .unwrap_or(prev_pitch)
        };
        next.push(pitch);
    }

    // Parallel-perfect repair: substitute the upper voice of the first
    // offending pair with its next-nearest chord tone.
    for _ in 0..n {
        let Some(upper) = find_parallel(prev, &next) else {
            break;
        };
        let range = &registers[upper];
        let original = next[upper];
        let mut candidates: Vec<u8> = pcs
            .iter()
            .map(|pc| place_pc_near(*pc, prev.pitches[upper], range))
            .filter(|p| *p != original)
            .collect();
        candidates.sort_by_key(|p| (*p as i16 - prev.pitches[upper] as i16).abs());

        let mut repaired = false;
        for candidate in candidates {
            let mut trial = next.clone();
            trial[upper] = candidate;
            if find_parallel(prev, &trial).is_none() {
                next = trial;
                repaired = true;
                break;
            }
        }
        if !repaired {
            break;
        }
    }

    let mut voicing = ChordVoicing { pitches: next };
    voicing.resort();
    voicing
}

//! Countersubject derivation.
//!
//! The countersubject runs against the answer in the voice that has
//! just finished the subject. It borrows the answer's rhythm (slightly
//! thinned) and moves in imperfect consonances below it, preferring
//! contrary motion.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::types::{Key, NoteEvent, NoteSource, Provenance, Tick, TransformStep};

use super::answer::Answer;

/// Consonant offsets below the reference pitch, in semitones.
/// Thirds, sixths, and tenths keep the pair invertible.
const CONSONANT_BELOW: [i16; 4] = [3, 4, 8, 9];

#[derive(Debug, Clone)]
pub struct Countersubject {
    pub key: Key,
    pub length_ticks: Tick,
    pub notes: Vec<NoteEvent>,
}

/// Derive a countersubject against `answer`, anchored at tick 0.
pub fn derive_countersubject(answer: &Answer, rng: &mut Pcg32) -> Countersubject {
    let mut notes: Vec<NoteEvent> = Vec::with_capacity(answer.notes.len());
    let mut prev_pitch: Option<u8> = None;
    let mut prev_ref: Option<u8> = None;

    for n in &answer.notes {
        // Thin the rhythm: merge occasional notes into the previous
        // value so the two lines do not move in lockstep throughout.
        if prev_pitch.is_some() && n.duration <= Tick::from(240u32) && rng.gen_bool(0.35) {
            if let Some(last) = notes.last_mut() {
                last.duration += n.duration;
            }
            prev_ref = Some(n.pitch);
            continue;
        }

        let mut best: Option<u8> = None;
        let mut best_score = i32::MIN;
        for &offset in &CONSONANT_BELOW {
            let candidate = i16::from(n.pitch) - offset;
            if !(0..=127).contains(&candidate) {
                continue;
            }
            let candidate = candidate as u8;
            if !answer.key.contains(candidate) {
                continue;
            }
            let mut score = 0;
            if let (Some(p), Some(r)) = (prev_pitch, prev_ref) {
                let own = i32::from(candidate) - i32::from(p);
                let other = i32::from(n.pitch) - i32::from(r);
                // Reward contrary motion, punish wide leaps.
                if own.signum() != other.signum() {
                    score += 4;
                }
                score -= own.abs() / 3;
            }
            score += rng.gen_range(0..3);
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        let pitch = best.unwrap_or_else(|| {
            answer
                .key
                .nearest_scale_tone((i16::from(n.pitch) - 4).max(0) as u8, -1)
        });
        let ev = NoteEvent::new(n.start_tick, n.duration, pitch, 0, NoteSource::Countersubject)
            .with_provenance(Provenance::new(pitch, n.start_tick));
        notes.push(ev);
        prev_pitch = Some(pitch);
        prev_ref = Some(n.pitch);
    }

    Countersubject {
        key: answer.key,
        length_ticks: answer.length_ticks,
        notes,
    }
}

/// Re-anchor a countersubject at `tick` in `voice`, transposed by
/// `shift` semitones to follow the concurrent entry's key.
pub fn restate_countersubject(
    cs: &Countersubject,
    tick: Tick,
    voice: u8,
    shift: i16,
) -> Vec<NoteEvent> {
    cs.notes
        .iter()
        .map(|n| {
            let mut ev = *n;
            ev.start_tick = tick + n.start_tick;
            ev.pitch = (i16::from(n.pitch) + shift).clamp(0, 127) as u8;
            ev.voice = voice;
            ev.trail_mut().source_tick = n.start_tick;
            if shift != 0 {
                ev.record(TransformStep::KeyTranspose);
            }
            ev
        })
        .collect()
}

//! Answer derivation.
//!
//! The answer restates the subject in the dominant. A real answer is
//! an exact transposition up a fifth; a tonal answer additionally maps
//! dominant-degree notes down to the tonic so the head of the answer
//! stays inside the home key.

use crate::types::{Key, NoteEvent, NoteSource, Tick, TransformStep};

use super::generate::Subject;

/// The dominant-key restatement of a subject.
#[derive(Debug, Clone)]
pub struct Answer {
    pub key: Key,
    pub tonal: bool,
    pub length_ticks: Tick,
    pub notes: Vec<NoteEvent>,
}

/// Whether the subject calls for a tonal answer: it does when the
/// head outlines the dominant degree, which a real transposition
/// would carry out of the key.
fn wants_tonal_answer(subject: &Subject) -> bool {
    let dominant = subject.key.dominant_pc();
    subject
        .notes
        .iter()
        .take(3)
        .any(|n| n.pitch % 12 == dominant)
}

/// Derive the answer for `subject`, anchored at tick 0 in voice 0.
pub fn derive_answer(subject: &Subject) -> Answer {
    let tonal = wants_tonal_answer(subject);
    let dominant_pc = subject.key.dominant_pc();
    let key = subject.key.dominant_key();

    let notes = subject
        .notes
        .iter()
        .map(|n| {
            // Tonal adjustment: dominant-degree notes move up a fourth
            // (to the tonic) instead of a fifth.
            let shift: i16 = if tonal && n.pitch % 12 == dominant_pc {
                5
            } else {
                7
            };
            let mut ev = *n;
            ev.pitch = (i16::from(n.pitch) + shift).clamp(0, 127) as u8;
            ev.source = NoteSource::Answer;
            ev.record(if tonal {
                TransformStep::TonalAnswer
            } else {
                TransformStep::RealAnswer
            });
            ev
        })
        .collect();

    Answer {
        key,
        tonal,
        length_ticks: subject.length_ticks,
        notes,
    }
}

/// Re-anchor an answer statement at `tick` in `voice`.
pub fn restate_answer(answer: &Answer, tick: Tick, voice: u8, entry_number: u8) -> Vec<NoteEvent> {
    answer
        .notes
        .iter()
        .map(|n| {
            let mut ev = *n;
            ev.start_tick = tick + n.start_tick;
            ev.voice = voice;
            let trail = ev.trail_mut();
            trail.entry_number = Some(entry_number);
            trail.source_tick = n.start_tick;
            ev
        })
        .collect()
}

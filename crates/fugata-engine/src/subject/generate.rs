//! Subject generation.
//!
//! A subject is a short monophonic line in the home key whose opening
//! notes (the head motif) carry the strongest identity and are never
//! altered by later passes. The rhythmic vocabulary and melodic
//! contour are weighted by the requested character.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::Character;

use crate::types::{
    Key, NoteEvent, NoteSource, Provenance, Tick, TransformStep, TICKS_PER_BAR, TICKS_PER_BEAT,
};

/// How many opening notes form the immutable head motif.
const HEAD_NOTES: usize = 3;

/// A generated fugue subject, anchored at tick 0 in voice 0.
#[derive(Debug, Clone)]
pub struct Subject {
    pub key: Key,
    pub character: Character,
    pub length_ticks: Tick,
    pub notes: Vec<NoteEvent>,
}

impl Subject {
    /// Final pitch of the subject line.
    pub fn last_pitch(&self) -> u8 {
        self.notes.last().map(|n| n.pitch).unwrap_or(60)
    }
}

/// Rhythm cells, one bar each, expressed in beat fractions.
fn rhythm_cells(character: Character) -> &'static [&'static [Tick]] {
    const Q: Tick = TICKS_PER_BEAT;
    const H: Tick = TICKS_PER_BEAT * 2;
    const E: Tick = TICKS_PER_BEAT / 2;
    match character {
        // Long opening values, even motion.
        Character::Noble => &[
            &[H, Q, Q],
            &[Q, Q, H],
            &[Q, Q, Q, Q],
            &[H, E, E, Q],
        ],
        // Eighth-note figures and short cells.
        Character::Playful => &[
            &[Q, E, E, Q, Q],
            &[E, E, E, E, Q, Q],
            &[Q, E, E, E, E, Q],
            &[E, E, Q, E, E, Q],
        ],
        // Heavy, mostly quarters, occasional suspension-length value.
        Character::Severe => &[
            &[Q, Q, Q, Q],
            &[H, Q, Q],
            &[Q, Q, H],
            &[H, H],
        ],
    }
}

/// Melodic step weights as (scale-degree delta, weight) pairs.
fn step_weights(character: Character) -> &'static [(i8, u32)] {
    match character {
        Character::Noble => &[(-2, 2), (-1, 5), (1, 5), (2, 3), (3, 1), (4, 1)],
        Character::Playful => &[(-3, 2), (-2, 3), (-1, 4), (1, 4), (2, 3), (3, 2), (4, 2)],
        Character::Severe => &[(-2, 2), (-1, 6), (1, 6), (2, 2), (-3, 1)],
    }
}

fn pick_weighted(rng: &mut Pcg32, table: &[(i8, u32)]) -> i8 {
    let total: u32 = table.iter().map(|&(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for &(delta, w) in table {
        if roll < w {
            return delta;
        }
        roll -= w;
    }
    table[table.len() - 1].0
}

/// Pitch of the given scale degree (0-based, may exceed 6 or go
/// negative for octave displacement) around middle register.
fn degree_pitch(key: &Key, degree: i32) -> u8 {
    let intervals = key.scale().intervals();
    let octave = degree.div_euclid(7);
    let idx = degree.rem_euclid(7) as usize;
    let pitch = 60 + i32::from(key.tonic) + i32::from(intervals[idx]) + octave * 12;
    pitch.clamp(36, 96) as u8
}

/// Generate a subject of `bars` bars in `key`, voiced around middle C.
pub fn generate_subject(key: Key, bars: u32, character: Character, rng: &mut Pcg32) -> Subject {
    let length_ticks = Tick::from(bars) * TICKS_PER_BAR;
    let cells = rhythm_cells(character);
    let steps = step_weights(character);

    // Assemble the rhythm bar by bar, trimming the last cell to fit.
    let mut durations: Vec<Tick> = Vec::new();
    let mut filled: Tick = 0;
    while filled < length_ticks {
        let cell = cells[rng.gen_range(0..cells.len())];
        for &d in cell {
            if filled + d > length_ticks {
                break;
            }
            durations.push(d);
            filled += d;
        }
        if filled < length_ticks && filled + TICKS_PER_BEAT > length_ticks {
            durations.push(length_ticks - filled);
            filled = length_ticks;
        }
    }

    // Contour: open on tonic or dominant, walk by weighted degree
    // steps, close on a tonic-triad degree.
    let mut degree: i32 = if rng.gen_bool(0.6) { 0 } else { 4 };
    let mut degrees: Vec<i32> = vec![degree];
    for _ in 1..durations.len() {
        let mut delta = i32::from(pick_weighted(rng, steps));
        // Keep the walk within a tenth of the opening note.
        if (degree + delta).abs() > 6 {
            delta = -delta;
        }
        degree += delta;
        degrees.push(degree);
    }
    if let Some(last) = degrees.last_mut() {
        // Land on tonic, third, or fifth degree.
        let target = [0, 2, 4]
            .iter()
            .copied()
            .min_by_key(|t| (t - *last).abs())
            .unwrap_or(0);
        *last = target;
    }

    let mut notes = Vec::with_capacity(durations.len());
    let mut tick: Tick = 0;
    for (i, (&dur, &deg)) in durations.iter().zip(degrees.iter()).enumerate() {
        let pitch = degree_pitch(&key, deg);
        let source = if i < HEAD_NOTES {
            NoteSource::SubjectCore
        } else {
            NoteSource::Subject
        };
        let ev = NoteEvent::new(tick, dur, pitch, 0, source)
            .with_provenance(Provenance::new(pitch, tick));
        notes.push(ev);
        tick += dur;
    }

    Subject {
        key,
        character,
        length_ticks,
        notes,
    }
}

/// Transpose a subject statement to `key`, re-anchored at `tick` in
/// `voice`, recording the transposition in each note's trail.
pub fn restate_subject(
    subject: &Subject,
    key: Key,
    tick: Tick,
    voice: u8,
    entry_number: u8,
) -> Vec<NoteEvent> {
    let shift = i16::from(key.tonic) - i16::from(subject.key.tonic);
    // Choose the displacement closest to zero.
    let shift = if shift > 6 {
        shift - 12
    } else if shift < -6 {
        shift + 12
    } else {
        shift
    };
    subject
        .notes
        .iter()
        .map(|n| {
            let mut ev = *n;
            ev.start_tick = tick + n.start_tick;
            ev.pitch = (i16::from(n.pitch) + shift).clamp(0, 127) as u8;
            ev.voice = voice;
            {
                let trail = ev.trail_mut();
                trail.entry_number = Some(entry_number);
                trail.source_tick = n.start_tick;
            }
            if shift != 0 {
                ev.record(TransformStep::KeyTranspose);
            }
            ev
        })
        .collect()
}

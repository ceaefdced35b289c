//! Cadence-approach shaping.
//!
//! Rewrites the outer voices over the two beats before each planned
//! cadence into a stock approach formula. Formulas are static tables
//! of degree steps; a degree step is written as a two-semitone shift,
//! the approximation the rest of the cadence machinery expects.
//! Shaped notes become `CadenceApproach` and are untouchable for the
//! rest of the pipeline.

use crate::harmony::{CadencePoint, CadenceType};
use crate::types::{
    ModifiedBy, NoteEvent, NoteSource, ProtectionLevel, Tick, TICKS_PER_BEAT,
};

use super::{max_voice, sort_for_passes};

/// Semitones per written degree step.
const DEGREE_STEP: i16 = 2;

/// A named approach: degree offsets relative to the final note of the
/// window, last element zero.
struct ApproachFormula {
    name: &'static str,
    soprano: &'static [i8],
    bass: &'static [i8],
}

fn formula_for(cadence: CadenceType) -> &'static ApproachFormula {
    match cadence {
        CadenceType::Perfect => &ApproachFormula {
            name: "authentic-step",
            soprano: &[2, 1, 0],
            bass: &[4, 0],
        },
        CadenceType::Half => &ApproachFormula {
            name: "half-lean",
            soprano: &[-1, 0],
            bass: &[1, 0],
        },
        CadenceType::Deceptive => &ApproachFormula {
            name: "deceptive-slip",
            soprano: &[2, 1, 0],
            bass: &[-1, 0],
        },
        CadenceType::Phrygian => &ApproachFormula {
            name: "phrygian-fall",
            soprano: &[-1, 0],
            bass: &[1, 0],
        },
        CadenceType::Plagal => &ApproachFormula {
            name: "plagal-swing",
            soprano: &[1, 0],
            bass: &[3, 0],
        },
        CadenceType::PicardyThird => &ApproachFormula {
            name: "picardy-close",
            soprano: &[2, 1, 0],
            bass: &[4, 0],
        },
    }
}

/// Apply `pattern` to the last `pattern.len()` notes of `voice` in
/// the two-beat window before `cadence_tick`.
fn shape_voice(
    notes: &mut [NoteEvent],
    voice: u8,
    cadence_tick: Tick,
    pattern: &[i8],
) -> usize {
    let window_start = cadence_tick.saturating_sub(2 * TICKS_PER_BEAT);
    let mut window: Vec<usize> = notes
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            n.voice == voice && n.start_tick >= window_start && n.start_tick < cadence_tick
        })
        .map(|(i, _)| i)
        .collect();
    if window.len() > pattern.len() {
        window.drain(..window.len() - pattern.len());
    }
    if window.is_empty() {
        return 0;
    }

    // The final window note anchors the formula.
    let reference = notes[window[window.len() - 1]].pitch;
    let offsets = &pattern[pattern.len() - window.len()..];

    let mut modified = 0usize;
    for (&i, &offset) in window.iter().zip(offsets.iter()) {
        if notes[i].protection() <= ProtectionLevel::SemiImmutable {
            continue;
        }
        let target = i16::from(reference) + i16::from(offset) * DEGREE_STEP;
        let target = target.clamp(0, 127) as u8;
        if target != notes[i].pitch {
            notes[i].pitch = target;
            notes[i].modified_by.insert(ModifiedBy::CHORD_SNAP);
            modified += 1;
        }
        notes[i].source = NoteSource::CadenceApproach;
    }
    modified
}

/// Name of the approach formula used for a cadence type, for reports.
pub fn approach_name(cadence: CadenceType) -> &'static str {
    formula_for(cadence).name
}

/// Shape every planned cadence. Returns the number of notes altered.
pub fn shape_cadence_approaches(notes: &mut [NoteEvent], cadences: &[CadencePoint]) -> usize {
    sort_for_passes(notes);
    let Some(bottom) = max_voice(notes) else {
        return 0;
    };
    let mut modified = 0usize;
    for point in cadences {
        let f = formula_for(point.cadence);
        modified += shape_voice(notes, 0, point.tick, f.soprano);
        if bottom != 0 {
            modified += shape_voice(notes, bottom, point.tick, f.bass);
        }
    }
    modified
}

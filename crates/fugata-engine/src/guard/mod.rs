//! Instrument impossibility guard.
//!
//! Runs last in the pipeline: everything upstream works on abstract
//! pitches, and this module reconciles the result with what the
//! target instrument can physically play. Instrument behavior hangs
//! off a trait; a factory maps the config tag to an implementation.

mod instruments;

#[cfg(test)]
mod tests;

pub use instruments::{instrument_for, Instrument, SoundingVerdict};

use crate::types::{ModifiedBy, NoteEvent, ProtectionLevel, Track, TransformStep};

/// A warning produced while repairing, surfaced on the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardWarning {
    pub tick: crate::types::Tick,
    pub voice: u8,
    pub message: String,
}

/// Outcome of a guard run.
#[derive(Debug, Default)]
pub struct GuardOutcome {
    pub modifications: usize,
    pub warnings: Vec<GuardWarning>,
}

/// Pull one pitch into range, honoring its protection level.
fn fix_pitch(
    guard: &dyn Instrument,
    note: &mut NoteEvent,
    prev_pitch: Option<u8>,
    outcome: &mut GuardOutcome,
) {
    if guard.is_pitch_playable(note.pitch) {
        return;
    }
    match note.protection() {
        ProtectionLevel::Immutable | ProtectionLevel::Architectural => {
            outcome.warnings.push(GuardWarning {
                tick: note.start_tick,
                voice: note.voice,
                message: format!(
                    "immutable pitch {} outside {} range",
                    note.pitch,
                    guard.name()
                ),
            });
        }
        ProtectionLevel::SemiImmutable | ProtectionLevel::Structural => {
            if let Some(p) = octave_search(guard, note.pitch, prev_pitch) {
                note.pitch = p;
                note.modified_by.insert(ModifiedBy::OCTAVE_ADJUST);
                note.record(TransformStep::RangeClamp);
                outcome.modifications += 1;
            }
        }
        ProtectionLevel::Flexible => {
            let fixed = octave_search(guard, note.pitch, prev_pitch)
                .unwrap_or_else(|| guard.clamp_to_range(note.pitch));
            if fixed != note.pitch {
                note.pitch = fixed;
                note.modified_by.insert(ModifiedBy::OCTAVE_ADJUST);
                note.record(TransformStep::RangeClamp);
                outcome.modifications += 1;
            }
        }
    }
}

/// Octave-shift search. Both directions are tried; ties break toward
/// the previous pitch to preserve the melodic contour.
fn octave_search(guard: &dyn Instrument, pitch: u8, prev_pitch: Option<u8>) -> Option<u8> {
    let mut candidates: Vec<u8> = Vec::new();
    for octaves in 1..=4i16 {
        for dir in [-1i16, 1] {
            let p = i16::from(pitch) + dir * 12 * octaves;
            if (0..=127).contains(&p) && guard.is_pitch_playable(p as u8) {
                candidates.push(p as u8);
            }
        }
        if !candidates.is_empty() {
            break;
        }
    }
    let anchor = prev_pitch.unwrap_or(pitch);
    candidates
        .into_iter()
        .min_by_key(|&p| (i16::from(p) - i16::from(anchor)).unsigned_abs())
}

/// Repair simultaneous-sounding violations at one tick. The group
/// spans all tracks: one instrument plays every voice.
fn repair_sounding(
    guard: &dyn Instrument,
    tracks: &mut [Track],
    group: &mut Vec<(usize, usize)>,
    outcome: &mut GuardOutcome,
) {
    loop {
        let pitches: Vec<u8> = group
            .iter()
            .map(|&(t, i)| tracks[t].notes[i].pitch)
            .collect();
        if pitches.len() < 2 || guard.check_sounding(&pitches) == SoundingVerdict::Playable {
            return;
        }
        let Some(&(vt, vi)) = group
            .iter()
            .find(|&&(t, i)| tracks[t].notes[i].protection() == ProtectionLevel::Flexible)
        else {
            let &(t, i) = &group[0];
            outcome.warnings.push(GuardWarning {
                tick: tracks[t].notes[i].start_tick,
                voice: tracks[t].notes[i].voice,
                message: format!("unplayable sounding group on {}", guard.name()),
            });
            return;
        };
        let victim = &mut tracks[vt].notes[vi];
        if guard.prefers_micro_offset() && victim.duration > 3 {
            // Bowed instruments: stagger instead of deleting.
            victim.start_tick += 2;
            victim.duration -= 2;
            victim.modified_by.insert(ModifiedBy::ARTICULATION);
        } else {
            victim.duration = 0;
        }
        outcome.modifications += 1;
        group.retain(|&(t, i)| !(t == vt && i == vi));
    }
}

/// Run range repair then sounding repair over every track, dropping
/// zero-duration notes at the end.
pub fn enforce_impossibility_guard(tracks: &mut [Track], guard: &dyn Instrument) -> GuardOutcome {
    let mut outcome = GuardOutcome::default();

    for track in tracks.iter_mut() {
        let mut prev: Option<u8> = None;
        for note in track.notes.iter_mut() {
            fix_pitch(guard, note, prev, &mut outcome);
            prev = Some(note.pitch);
        }
    }

    let mut onsets: Vec<crate::types::Tick> = tracks
        .iter()
        .flat_map(|t| t.notes.iter().map(|n| n.start_tick))
        .collect();
    onsets.sort_unstable();
    onsets.dedup();

    for tick in onsets {
        let mut group: Vec<(usize, usize)> = Vec::new();
        for (t, track) in tracks.iter().enumerate() {
            for (i, n) in track.notes.iter().enumerate() {
                if n.sounds_at(tick) {
                    group.push((t, i));
                }
            }
        }
        if group.len() > 1 {
            repair_sounding(guard, tracks, &mut group, &mut outcome);
        }
    }

    for track in tracks.iter_mut() {
        track.notes.retain(|n| n.duration > 0);
    }
    outcome
}

//! Template realization against a chord voicing.

use crate::harmony::{ChordVoicing, HarmonicEvent};
use crate::types::{NoteEvent, NoteSource, Tick, VoiceRange};

use super::template::{FigurationTemplate, NctFunction};

/// Maximum soprano leap (semitones) the melodic-memory hook accepts
/// when a closer alternative exists.
const MAX_SOPRANO_LEAP: i16 = 7;

/// Realize a template against a chord voicing at `beat_tick`.
///
/// Each step resolves its `scale_offset` to the nearest diatonic scale
/// tone in the indicated direction, clamped to the emitting voice's
/// register. Passing steps keep the surrounding motion stepwise; when
/// the enclosure check fails the step falls back to the plain chord
/// tone. `prev_soprano` is the previous beat's terminal soprano pitch:
/// when provided, a same-note repetition at the beat boundary prefers
/// the opposite scale offset, and large soprano leaps are folded back
/// toward the previous pitch.
pub fn apply_figuration(
    template: &FigurationTemplate,
    voicing: &ChordVoicing,
    event: &HarmonicEvent,
    registers: &[VoiceRange],
    beat_tick: Tick,
    prev_soprano: Option<u8>,
) -> Vec<NoteEvent> {
    let key = event.key;
    let mut notes: Vec<NoteEvent> = Vec::with_capacity(template.steps.len());

    for step in &template.steps {
        let vidx = (step.voice_index as usize).min(voicing.pitches.len().saturating_sub(1));
        let base = match voicing.pitches.get(vidx) {
            Some(p) => *p,
            None => continue,
        };
        let range = registers
            .get(vidx)
            .copied()
            .unwrap_or(VoiceRange { low: 21, high: 108 });

        let mut pitch = if step.scale_offset == 0 {
            base
        } else {
            range.clamp(key.nearest_scale_tone(base, step.scale_offset))
        };

        // Passing enclosure: the step out of and back into chord tones
        // must stay within a major third, otherwise revert.
        if step.nct == NctFunction::Passing {
            if let Some(prev) = notes.last() {
                if (pitch as i16 - prev.pitch as i16).abs() > 4 {
                    pitch = base;
                }
            }
        }

        // Melodic-memory hook at the beat boundary, soprano only.
        if step.relative_tick == 0 && vidx == 0 {
            if let Some(prev) = prev_soprano {
                if pitch == prev && step.scale_offset != 0 {
                    let flipped = range.clamp(key.nearest_scale_tone(base, -step.scale_offset));
                    if flipped != prev {
                        pitch = flipped;
                    }
                } else if pitch == prev {
                    // Same chord tone twice across the boundary: take the
                    // nearest other voicing pitch when one exists.
                    if let Some(alt) = voicing
                        .pitches
                        .iter()
                        .copied()
                        .filter(|p| *p != prev && range.contains(*p))
                        .min_by_key(|p| (*p as i16 - prev as i16).abs())
                    {
                        pitch = alt;
                    }
                }
                let leap = (pitch as i16 - prev as i16).abs();
                if leap > MAX_SOPRANO_LEAP {
                    if let Some(closer) = voicing
                        .pitches
                        .iter()
                        .copied()
                        .filter(|p| range.contains(*p))
                        .min_by_key(|p| (*p as i16 - prev as i16).abs())
                    {
                        if (closer as i16 - prev as i16).abs() < leap {
                            pitch = closer;
                        }
                    }
                }
            }
        }

        notes.push(NoteEvent::new(
            beat_tick + step.relative_tick,
            step.duration,
            pitch,
            vidx as u8,
            NoteSource::PreludeFiguration,
        ));
    }
    notes
}

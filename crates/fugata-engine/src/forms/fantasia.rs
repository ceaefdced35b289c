//! The fantasia pipeline.
//!
//! Rhetorical sections in rotation: block harmony, a short point of
//! imitation passed through the voices, and a free recitative line
//! with breaths between phrases. The cadential-coverage window is
//! wider than the fugue's; a fantasia tolerates longer stretches
//! without resolution.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::FantasiaConfig;

use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, ChordVoicing, HarmonicEvent,
};
use crate::passes::CoverageOptions;
use crate::rng::rng_for;
use crate::structure::FugueStructure;
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::generate_tonal_plan;
use crate::types::{
    Key, NoteEvent, NoteSource, Tick, VoiceRange, TICKS_PER_BAR, TICKS_PER_BEAT,
};

use super::{empty_score, finish, place_pc, registers_for, FormOutput, GenerateResult, PassTuning};

const SECTION_BARS: Tick = 4;

/// Coverage window for the fantasia's loose rhetoric.
const FANTASIA_COVERAGE_BARS: u32 = 24;

/// Sustained block chords, one per harmonic event.
fn chordal_notes(
    events: &[HarmonicEvent],
    num_voices: u8,
    registers: &[VoiceRange],
    prev_voicing: &mut Option<ChordVoicing>,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    for event in events {
        let voicing = match prev_voicing.as_ref() {
            Some(p) => smooth_voice_leading(p, event, num_voices, registers),
            None => voice_chord(event, num_voices, registers),
        };
        for (v, &pitch) in voicing.pitches.iter().enumerate() {
            notes.push(NoteEvent::new(
                event.tick,
                event.end_tick - event.tick,
                pitch,
                v as u8,
                NoteSource::Texture,
            ));
        }
        *prev_voicing = Some(voicing);
    }
    notes
}

/// A four-note step contour to be imitated; the head anchors on the
/// tonic.
fn imitation_motif(rng: &mut Pcg32) -> [i8; 4] {
    let contours: [[i8; 4]; 4] = [[0, 1, 2, 1], [0, -1, -2, 0], [0, 2, 1, 0], [0, 1, -1, 0]];
    contours[rng.gen_range(0..contours.len())]
}

/// The motif stated in every voice at one-bar offsets.
fn imitative_notes(
    key: Key,
    start: Tick,
    end: Tick,
    num_voices: u8,
    registers: &[VoiceRange],
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let contour = imitation_motif(rng);
    let mut notes = Vec::new();
    for voice in 0..num_voices {
        let Some(range) = registers.get(voice as usize) else {
            continue;
        };
        let entry = start + Tick::from(voice) * TICKS_PER_BAR;
        if entry >= end {
            break;
        }
        let mut pitch = place_pc(range, key.tonic);
        let mut tick = entry;
        for &step in &contour {
            if tick >= end {
                break;
            }
            for _ in 0..step.abs() {
                pitch = key.nearest_scale_tone(pitch, step.signum());
            }
            pitch = range.clamp(pitch);
            let dur = TICKS_PER_BEAT.min(end - tick);
            notes.push(NoteEvent::new(
                tick,
                dur,
                pitch,
                voice,
                NoteSource::FreeCounterpoint,
            ));
            tick += dur;
        }
        // The entrant continues in free quarters to the section end.
        while tick < end {
            let dir = if rng.gen_bool(0.5) { 1 } else { -1 };
            pitch = range.clamp(key.nearest_scale_tone(pitch, dir));
            let dur = TICKS_PER_BEAT.min(end - tick);
            notes.push(NoteEvent::new(
                tick,
                dur,
                pitch,
                voice,
                NoteSource::FreeCounterpoint,
            ));
            tick += dur;
        }
    }
    notes
}

/// A lone declamatory line with a breath after each phrase.
fn recitative_notes(
    key: Key,
    start: Tick,
    end: Tick,
    range: &VoiceRange,
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let mut pitch = place_pc(range, key.dominant_pc());
    let mut tick = start;
    while tick < end {
        // Phrase of 3-5 notes, then half a bar of silence.
        let phrase_len = rng.gen_range(3..=5);
        for _ in 0..phrase_len {
            if tick >= end {
                break;
            }
            let dur = if rng.gen_bool(0.3) {
                TICKS_PER_BEAT
            } else {
                TICKS_PER_BEAT / 2
            };
            let dur = dur.min(end - tick);
            notes.push(NoteEvent::new(tick, dur, pitch, 0, NoteSource::Ornament));
            let dir = if rng.gen_bool(0.6) { -1 } else { 1 };
            pitch = range.clamp(key.nearest_scale_tone(pitch, dir));
            tick += dur;
        }
        tick += TICKS_PER_BAR / 2;
    }
    notes
}

pub fn generate_fantasia(cfg: &FantasiaConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.bars == 0 {
        return Ok(empty_score("fantasia", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let total_ticks = Tick::from(cfg.bars) * TICKS_PER_BAR;

    let mut plan_rng = rng_for(seed, "fantasia-plan");
    let tonal_plan = generate_tonal_plan(key, total_ticks, &mut plan_rng);
    let mut timeline = tonal_plan.to_detailed_timeline(total_ticks);

    let mut rng = rng_for(seed, "fantasia-sections");
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut tempo_sections: Vec<(Tick, f64)> = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;

    let mut cursor: Tick = 0;
    let mut section = 0u32;
    while cursor < total_ticks {
        let end = (cursor + SECTION_BARS * TICKS_PER_BAR).min(total_ticks);
        match section % 3 {
            0 => {
                let events: Vec<HarmonicEvent> = timeline.range(cursor, end).to_vec();
                notes.extend(chordal_notes(
                    &events,
                    num_voices,
                    &registers,
                    &mut prev_voicing,
                ));
                tempo_sections.push((cursor, 0.0));
            }
            1 => {
                notes.extend(imitative_notes(
                    key,
                    cursor,
                    end,
                    num_voices,
                    &registers,
                    &mut rng,
                ));
                tempo_sections.push((cursor, 0.05));
            }
            _ => {
                notes.extend(recitative_notes(key, cursor, end, &registers[0], &mut rng));
                // Recitative runs broad and free.
                tempo_sections.push((cursor, -0.08));
            }
        }
        // A phrygian lean closes each recitative, a half cadence the
        // other interior sections.
        if end < total_ticks {
            let cadence = if section % 3 == 2 {
                CadenceType::Phrygian
            } else {
                CadenceType::Half
            };
            let section_key = tonal_plan.key_at_tick(end);
            cadences.push(CadencePoint {
                tick: end,
                cadence,
                key: section_key,
            });
            timeline.apply_cadence(
                cadence,
                section_key,
                end.saturating_sub(2 * TICKS_PER_BEAT),
                end,
            );
        }
        cursor = end;
        section += 1;
    }

    let final_cadence = if key.minor {
        CadenceType::PicardyThird
    } else {
        CadenceType::Perfect
    };
    cadences.push(CadencePoint {
        tick: total_ticks,
        cadence: final_cadence,
        key,
    });
    timeline.apply_cadence(
        final_cadence,
        key,
        total_ticks.saturating_sub(2 * TICKS_PER_BEAT),
        total_ticks,
    );

    let out = FormOutput {
        form: "fantasia",
        key,
        num_voices,
        seed,
        attempts: 1,
        instrument: cfg.instrument,
        notes,
        timeline,
        tonal_plan,
        structure: FugueStructure::new(),
        cadences,
        tempo_sections,
        base_bpm: base_bpm("fantasia") * character_scale(cfg.character),
    };
    let tuning = PassTuning {
        coverage: CoverageOptions {
            max_bars: FANTASIA_COVERAGE_BARS,
            ..CoverageOptions::default()
        },
        ..PassTuning::default()
    };
    Ok(finish(out, tuning))
}

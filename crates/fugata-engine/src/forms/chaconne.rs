//! The chaconne pipeline.
//!
//! A fixed harmonic scheme cycles under ten planned variations. The
//! ground bass follows the scheme and is immutable; upper voices take
//! a texture drawn from each variation's allowed types. A failed
//! variation is retried with a seed derivative; the harmonic scaffold
//! is never touched during recovery.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::{ChaconneConfig, MajorSectionTexture};

use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, ChordVoicing, HarmonicEvent,
    HarmonicTimeline,
};
use crate::figuration::{apply_figuration, select_template};
use crate::rng::rng_for_indexed;
use crate::structure::{
    create_standard_variation_plan, validate_variation_plan, ChaconneScheme, FugueStructure,
    Variation, VariationType,
};
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::TonalPlan;
use crate::types::{
    Key, NoteEvent, NoteSource, Tick, VoiceRange, TICKS_PER_BAR, TICKS_PER_BEAT,
};

use super::{
    empty_score, finish, place_pc, registers_for, FormOutput, GenerateError, GenerateResult,
    PassTuning,
};

/// Map a config texture cap onto plan variation types.
fn texture_types(cap: &[MajorSectionTexture]) -> Vec<VariationType> {
    cap.iter()
        .map(|t| match t {
            MajorSectionTexture::Cantabile => VariationType::Cantabile,
            MajorSectionTexture::Chordal => VariationType::Chordal,
            MajorSectionTexture::Flowing => VariationType::Flowing,
        })
        .collect()
}

/// The ground bass: the scheme's bass line, immutable.
fn ground_bass(events: &[HarmonicEvent], bass_voice: u8, range: &VoiceRange) -> Vec<NoteEvent> {
    events
        .iter()
        .map(|e| {
            let pitch = place_pc(range, e.bass_pitch % 12);
            NoteEvent::new(
                e.tick,
                e.end_tick - e.tick,
                pitch,
                bass_voice,
                NoteSource::GroundBass,
            )
        })
        .collect()
}

/// Realize one variation's upper voices over its scheme events.
fn variation_texture(
    texture: VariationType,
    events: &[HarmonicEvent],
    upper_voices: u8,
    registers: &[VoiceRange],
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;
    let mut prev_soprano: Option<u8> = None;

    for event in events {
        let voicing = match &prev_voicing {
            Some(p) => smooth_voice_leading(p, event, upper_voices, registers),
            None => voice_chord(event, upper_voices, registers),
        };

        match texture {
            VariationType::Theme | VariationType::Chordal => {
                // Sustained chords; chordal restates per beat.
                let step = if texture == VariationType::Chordal {
                    TICKS_PER_BEAT
                } else {
                    event.end_tick - event.tick
                };
                let mut tick = event.tick;
                while tick < event.end_tick {
                    let dur = step.min(event.end_tick - tick);
                    for (v, &pitch) in voicing.pitches.iter().enumerate() {
                        notes.push(NoteEvent::new(
                            tick,
                            dur,
                            pitch,
                            v as u8,
                            NoteSource::Texture,
                        ));
                    }
                    tick += dur;
                }
            }
            VariationType::Cantabile => {
                // A singing top line on chord tones, held support below.
                let mut tick = event.tick;
                while tick < event.end_tick {
                    let dur = TICKS_PER_BEAT.min(event.end_tick - tick);
                    let soprano = voicing.soprano().unwrap_or(72);
                    let pitch = if rng.gen_bool(0.4) {
                        event.key.nearest_scale_tone(soprano, if rng.gen_bool(0.5) { 1 } else { -1 })
                    } else {
                        soprano
                    };
                    notes.push(NoteEvent::new(
                        tick,
                        dur,
                        pitch,
                        0,
                        NoteSource::FreeCounterpoint,
                    ));
                    tick += dur;
                }
                for (v, &pitch) in voicing.pitches.iter().enumerate().skip(1) {
                    notes.push(NoteEvent::new(
                        event.tick,
                        event.end_tick - event.tick,
                        pitch,
                        v as u8,
                        NoteSource::Texture,
                    ));
                }
            }
            VariationType::Flowing | VariationType::Virtuosic | VariationType::Perpetuum => {
                // Figurated: one template per beat, re-sourced as
                // arpeggio material so the prelude passes ignore it.
                let mut beat = event.tick - event.tick % TICKS_PER_BEAT;
                if beat < event.tick {
                    beat += TICKS_PER_BEAT;
                }
                while beat < event.end_tick {
                    let template = select_template(rng, upper_voices);
                    let mut beat_notes = apply_figuration(
                        &template,
                        &voicing,
                        event,
                        registers,
                        beat,
                        prev_soprano,
                    );
                    for n in beat_notes.iter_mut() {
                        n.source = NoteSource::Arpeggio;
                    }
                    prev_soprano = beat_notes
                        .iter()
                        .filter(|n| n.voice == 0)
                        .last()
                        .map(|n| n.pitch)
                        .or(prev_soprano);
                    notes.extend(beat_notes);
                    beat += TICKS_PER_BEAT;
                }
            }
        }
        prev_voicing = Some(voicing);
    }
    notes
}

/// A generated variation must keep its scheme intact and produce
/// sounding material.
fn variation_ok(notes: &[NoteEvent], span_start: Tick, span_end: Tick) -> bool {
    !notes.is_empty()
        && notes
            .iter()
            .all(|n| n.start_tick >= span_start && n.start_tick < span_end && n.duration > 0)
}

pub fn generate_chaconne(cfg: &ChaconneConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.variation_bars == 0 {
        return Ok(empty_score("chaconne", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let bass_voice = num_voices - 1;

    let scheme = ChaconneScheme::standard_minor();
    let plan = create_standard_variation_plan(key);
    validate_variation_plan(&plan)?;

    // Each variation spans a whole number of scheme cycles.
    let cycle_ticks = Tick::from(scheme.cycle_beats()) * TICKS_PER_BEAT;
    let requested = Tick::from(cfg.variation_bars) * TICKS_PER_BAR;
    let cycles = (requested / cycle_ticks).max(1);
    let var_ticks = cycles * cycle_ticks;
    let total_ticks = var_ticks * plan.variations.len() as Tick;

    let major_cap = texture_types(&cfg.major_section_textures);

    let mut timeline = HarmonicTimeline::new();
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut tempo_sections: Vec<(Tick, f64)> = Vec::new();
    let mut attempts: u32 = 0;

    for (index, variation) in plan.variations.iter().enumerate() {
        let offset = index as Tick * var_ticks;

        // The scaffold: this never changes across retries.
        let local = scheme.to_timeline(variation.key, var_ticks);
        for e in local.events() {
            let mut shifted = *e;
            shifted.tick += offset;
            shifted.end_tick += offset;
            timeline.push(shifted)?;
        }
        let events: Vec<HarmonicEvent> = timeline
            .range(offset, offset + var_ticks)
            .to_vec();

        notes.extend(ground_bass(
            &events,
            bass_voice,
            &registers[bass_voice as usize],
        ));

        // Texture choice respects the major-section cap when the
        // variation sits in the parallel major.
        let allowed = allowed_textures(variation, key, &major_cap);
        if allowed.is_empty() {
            return Err(GenerateError::StructuralFail(format!(
                "variation {index} has no permitted texture"
            )));
        }

        let upper = notes_for_variation(
            &allowed,
            &events,
            num_voices,
            &registers,
            seed,
            index as u32,
            cfg.max_variation_retries,
            offset,
            offset + var_ticks,
            &mut attempts,
        )?;
        notes.extend(upper);

        // Non-final variations close with a half cadence into the
        // next cycle; tempo eases a little for the illuminated one.
        if index + 1 < plan.variations.len() {
            cadences.push(CadencePoint {
                tick: offset + var_ticks,
                cadence: CadenceType::Half,
                key: variation.key,
            });
        }
        let offset_frac = if variation.key != key { -0.06 } else { 0.0 };
        tempo_sections.push((offset, offset_frac));
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
        form: "chaconne",
        key,
        num_voices,
        seed,
        attempts: attempts.max(1),
        instrument: cfg.instrument,
        notes,
        timeline,
        tonal_plan: TonalPlan {
            home: key,
            modulations: Vec::new(),
        },
        structure: FugueStructure::new(),
        cadences,
        tempo_sections,
        base_bpm: base_bpm("chaconne") * character_scale(cfg.character),
    };
    Ok(finish(out, PassTuning::default()))
}

/// The texture types a variation may use after the major-section cap.
fn allowed_textures(
    variation: &Variation,
    home: Key,
    major_cap: &[VariationType],
) -> Vec<VariationType> {
    let in_major_section = home.minor && !variation.key.minor;
    if in_major_section && !major_cap.is_empty() {
        let capped: Vec<VariationType> = variation
            .allowed
            .iter()
            .copied()
            .filter(|t| major_cap.contains(t))
            .collect();
        if !capped.is_empty() {
            return capped;
        }
    }
    variation.allowed.clone()
}

/// Generate one variation's upper voices with the bounded retry loop.
#[allow(clippy::too_many_arguments)]
fn notes_for_variation(
    allowed: &[VariationType],
    events: &[HarmonicEvent],
    num_voices: u8,
    registers: &[VoiceRange],
    seed: u32,
    index: u32,
    max_retries: u8,
    span_start: Tick,
    span_end: Tick,
    attempts: &mut u32,
) -> Result<Vec<NoteEvent>, GenerateError> {
    let upper_voices = num_voices.saturating_sub(1).max(1);
    for attempt in 0..=u32::from(max_retries) {
        *attempts += 1;
        // Seed derivative per attempt; the scaffold is untouched.
        let mut rng = rng_for_indexed(seed.wrapping_add(attempt), "chaconne-variation", index);
        let texture = allowed[rng.gen_range(0..allowed.len())];
        let notes = variation_texture(texture, events, upper_voices, registers, &mut rng);
        if variation_ok(&notes, span_start, span_end) {
            return Ok(notes);
        }
    }
    Err(GenerateError::StructuralFail(format!(
        "variation {index} failed after {} attempts",
        u32::from(max_retries) + 1
    )))
}

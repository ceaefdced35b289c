//! The passacaglia pipeline.
//!
//! A bar-per-chord ground cycles under a fixed number of statements.
//! The bass states the ground alone first; upper voices enter with
//! sustained harmony, move to beat figuration, and close in running
//! lines, so density climbs across the statements.

use rand_pcg::Pcg32;

use fugata_spec::PassacagliaConfig;

use crate::figuration::{apply_figuration, select_template};
use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, ChordDegree, ChordQuality,
    ChordVoicing, HarmonicEvent,
};
use crate::rng::rng_for_indexed;
use crate::structure::{ChaconneScheme, FugueStructure, SchemeEntry};
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::TonalPlan;
use crate::types::{
    Key, NoteEvent, NoteSource, Tick, VoiceRange, TICKS_PER_BAR, TICKS_PER_BEAT,
};

use super::{empty_score, finish, place_pc, registers_for, FormOutput, GenerateResult, PassTuning};

/// Bar-per-chord descending ground over `ground_bars` bars.
///
/// The cycle walks the lament tetrachord in minor and a plagal turn
/// in major; the final bar is always the dominant so each statement
/// cadences into the next.
fn ground_scheme(key: Key, ground_bars: u8) -> ChaconneScheme {
    let cycle: [(ChordDegree, ChordQuality); 4] = if key.minor {
        [
            (ChordDegree::I, ChordQuality::Minor),
            (ChordDegree::FlatVII, ChordQuality::Major),
            (ChordDegree::VI, ChordQuality::Major),
            (ChordDegree::V, ChordQuality::Major),
        ]
    } else {
        [
            (ChordDegree::I, ChordQuality::Major),
            (ChordDegree::VI, ChordQuality::Minor),
            (ChordDegree::IV, ChordQuality::Major),
            (ChordDegree::V, ChordQuality::Major),
        ]
    };
    let beats_per_bar = crate::types::BEATS_PER_BAR as u32;
    let mut entries = Vec::with_capacity(ground_bars as usize);
    for bar in 0..u32::from(ground_bars) {
        let (degree, quality) = if bar + 1 == u32::from(ground_bars) {
            (ChordDegree::V, ChordQuality::Major)
        } else {
            cycle[bar as usize % cycle.len()]
        };
        entries.push(SchemeEntry {
            degree,
            quality,
            preferred_inversion: 0,
            weight: 1.0,
            position_beats: bar * beats_per_bar,
            duration_beats: beats_per_bar,
        });
    }
    ChaconneScheme::new(entries)
}

/// The immutable bass line: one whole note per ground chord.
fn ground_statement(events: &[HarmonicEvent], bass_voice: u8, range: &VoiceRange) -> Vec<NoteEvent> {
    events
        .iter()
        .map(|e| {
            NoteEvent::new(
                e.tick,
                e.end_tick - e.tick,
                place_pc(range, e.bass_pitch % 12),
                bass_voice,
                NoteSource::GroundBass,
            )
        })
        .collect()
}

/// Density tier of a statement: 0 silent uppers, then sustained,
/// figured, running.
fn density_tier(statement: u32, statements: u32) -> u32 {
    if statement == 0 {
        return 0;
    }
    1 + statement.saturating_sub(1) * 3 / statements.max(1)
}

fn upper_voices_for(
    tier: u32,
    events: &[HarmonicEvent],
    upper_voices: u8,
    registers: &[VoiceRange],
    prev_voicing: &mut Option<ChordVoicing>,
    prev_soprano: &mut Option<u8>,
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    for event in events {
        let voicing = match prev_voicing.as_ref() {
            Some(p) => smooth_voice_leading(p, event, upper_voices, registers),
            None => voice_chord(event, upper_voices, registers),
        };
        match tier {
            0 => {}
            1 => {
                for (v, &pitch) in voicing.pitches.iter().enumerate() {
                    notes.push(NoteEvent::new(
                        event.tick,
                        event.end_tick - event.tick,
                        pitch,
                        v as u8,
                        NoteSource::Texture,
                    ));
                }
            }
            _ => {
                // Figured: one template per beat, re-sourced so the
                // ornament pass leaves it alone.
                let mut beat = event.tick;
                while beat < event.end_tick {
                    let template = select_template(rng, upper_voices);
                    let mut beat_notes = apply_figuration(
                        &template,
                        &voicing,
                        event,
                        registers,
                        beat,
                        *prev_soprano,
                    );
                    for n in beat_notes.iter_mut() {
                        n.source = NoteSource::Arpeggio;
                        // Running tier halves every value.
                        if tier >= 3 {
                            n.duration = (n.duration / 2).max(TICKS_PER_BEAT / 4);
                        }
                    }
                    *prev_soprano = beat_notes
                        .iter()
                        .filter(|n| n.voice == 0)
                        .last()
                        .map(|n| n.pitch)
                        .or(*prev_soprano);
                    notes.extend(beat_notes);
                    beat += TICKS_PER_BEAT;
                }
            }
        }
        *prev_voicing = Some(voicing);
    }
    notes
}

pub fn generate_passacaglia(cfg: &PassacagliaConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.statements == 0 || cfg.ground_bars == 0 {
        return Ok(empty_score("passacaglia", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let bass_voice = num_voices - 1;
    let upper_voices = num_voices - 1;

    let scheme = ground_scheme(key, cfg.ground_bars);
    let ground_ticks = Tick::from(cfg.ground_bars) * TICKS_PER_BAR;
    let statements = u32::from(cfg.statements);
    let total_ticks = ground_ticks * Tick::from(statements);
    let mut timeline = scheme.to_timeline(key, total_ticks);

    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut tempo_sections: Vec<(Tick, f64)> = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;
    let mut prev_soprano: Option<u8> = None;

    for statement in 0..statements {
        let offset = Tick::from(statement) * ground_ticks;
        let events: Vec<HarmonicEvent> = timeline.range(offset, offset + ground_ticks).to_vec();

        notes.extend(ground_statement(
            &events,
            bass_voice,
            &registers[bass_voice as usize],
        ));

        if upper_voices > 0 {
            let tier = density_tier(statement, statements);
            let mut rng = rng_for_indexed(seed, "passacaglia-statement", statement);
            notes.extend(upper_voices_for(
                tier,
                &events,
                upper_voices,
                &registers,
                &mut prev_voicing,
                &mut prev_soprano,
                &mut rng,
            ));
        }

        // Every other statement boundary carries a half cadence; the
        // ground's own dominant bar supplies the rest.
        if statement + 1 < statements && statement % 2 == 1 {
            cadences.push(CadencePoint {
                tick: offset + ground_ticks,
                cadence: CadenceType::Half,
                key,
            });
        }
        // Density ramp: broad opening, pressing close.
        let progress = f64::from(statement) / f64::from(statements.max(2) - 1);
        tempo_sections.push((offset, -0.05 + 0.10 * progress));
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
        form: "passacaglia",
        key,
        num_voices,
        seed,
        attempts: 1,
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
        base_bpm: base_bpm("passacaglia") * character_scale(cfg.character),
    };
    Ok(finish(out, PassTuning::default()))
}

//! The toccata pipeline.
//!
//! Free gesture sections alternate with figured sections. A gesture
//! runs sixteenths over a bass pedal and closes on a fermata chord
//! with a breath of silence before the next section; a figured
//! section plays a repeated rhythmic figure over voiced harmony.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::{Character, ToccataConfig};

use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, ChordVoicing, HarmonicEvent,
    HarmonicTimeline,
};
use crate::rng::rng_for;
use crate::structure::FugueStructure;
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::generate_tonal_plan;
use crate::types::{
    Key, NoteEvent, NoteSource, Tick, VoiceRange, TICKS_PER_BAR, TICKS_PER_BEAT,
};

use super::{empty_score, finish, place_pc, registers_for, FormOutput, GenerateResult, PassTuning};

const SIXTEENTH: Tick = TICKS_PER_BEAT / 4;

/// A scalar sweep in the top voice, bouncing off the register edges.
fn gesture_run(
    key: Key,
    start: Tick,
    end: Tick,
    range: &VoiceRange,
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let mut pitch = place_pc(range, key.tonic);
    let mut dir: i8 = if rng.gen_bool(0.5) { 1 } else { -1 };
    let mut tick = start;
    while tick < end {
        let dur = SIXTEENTH.min(end - tick);
        notes.push(NoteEvent::new(
            tick,
            dur,
            pitch,
            0,
            NoteSource::ToccataGesture,
        ));
        let next = key.nearest_scale_tone(pitch, dir);
        if !range.contains(next) {
            dir = -dir;
            pitch = key.nearest_scale_tone(pitch, dir);
        } else {
            pitch = next;
        }
        // Direction flips occasionally mid-run at bar lines.
        if (tick + dur) % TICKS_PER_BAR == 0 && rng.gen_bool(0.4) {
            dir = -dir;
        }
        tick += dur;
    }
    notes
}

/// Bass pedal under a gesture: one held tonic per bar.
fn pedal_notes(key: Key, start: Tick, end: Tick, bass_voice: u8, range: &VoiceRange) -> Vec<NoteEvent> {
    let pitch = place_pc(range, key.tonic);
    let mut notes = Vec::new();
    let mut tick = start;
    while tick < end {
        let dur = TICKS_PER_BAR.min(end - tick);
        notes.push(NoteEvent::new(tick, dur, pitch, bass_voice, NoteSource::Pedal));
        tick += dur;
    }
    notes
}

/// Fermata chord on a gesture's last beat, then silence to the break.
fn pause_chord(
    event: &HarmonicEvent,
    tick: Tick,
    num_voices: u8,
    registers: &[VoiceRange],
) -> Vec<NoteEvent> {
    let voicing = voice_chord(event, num_voices, registers);
    voicing
        .pitches
        .iter()
        .enumerate()
        .map(|(v, &pitch)| {
            NoteEvent::new(tick, TICKS_PER_BEAT / 2, pitch, v as u8, NoteSource::GrandPause)
        })
        .collect()
}

/// Figured section: a repeated rhythm on the top voice, chords below.
fn figure_notes(
    events: &[HarmonicEvent],
    num_voices: u8,
    registers: &[VoiceRange],
    character: Character,
    prev_voicing: &mut Option<ChordVoicing>,
) -> Vec<NoteEvent> {
    // Severe characters take the dotted figure, the rest even eighths.
    let (first, second) = match character {
        Character::Severe => (TICKS_PER_BEAT * 3 / 4, TICKS_PER_BEAT / 4),
        _ => (TICKS_PER_BEAT / 2, TICKS_PER_BEAT / 2),
    };

    let mut notes = Vec::new();
    for event in events {
        let voicing = match prev_voicing.as_ref() {
            Some(p) => smooth_voice_leading(p, event, num_voices, registers),
            None => voice_chord(event, num_voices, registers),
        };
        let mut tick = event.tick;
        while tick < event.end_tick {
            let beat = TICKS_PER_BEAT.min(event.end_tick - tick);
            if let Some(&soprano) = voicing.pitches.first() {
                notes.push(NoteEvent::new(
                    tick,
                    first.min(beat),
                    soprano,
                    0,
                    NoteSource::ToccataFigure,
                ));
                if beat > first {
                    let upper = event.key.nearest_scale_tone(soprano, 1);
                    notes.push(NoteEvent::new(
                        tick + first,
                        second.min(beat - first),
                        upper,
                        0,
                        NoteSource::ToccataFigure,
                    ));
                }
            }
            tick += beat;
        }
        // Lower voices hold through the event.
        for (v, &pitch) in voicing.pitches.iter().enumerate().skip(1) {
            notes.push(NoteEvent::new(
                event.tick,
                event.end_tick - event.tick,
                pitch,
                v as u8,
                NoteSource::ToccataFigure,
            ));
        }
        *prev_voicing = Some(voicing);
    }
    notes
}

pub fn generate_toccata(cfg: &ToccataConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.bars == 0 || cfg.gesture_sections == 0 {
        return Ok(empty_score("toccata", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let bass_voice = num_voices - 1;
    let total_ticks = Tick::from(cfg.bars) * TICKS_PER_BAR;

    let mut plan_rng = rng_for(seed, "toccata-plan");
    let tonal_plan = generate_tonal_plan(key, total_ticks, &mut plan_rng);
    let mut timeline: HarmonicTimeline = tonal_plan.to_detailed_timeline(total_ticks);

    // Gesture sections alternate with figured ones: G F G F ... G.
    let section_count = 2 * u32::from(cfg.gesture_sections) - 1;
    let bars_per = (u32::from(cfg.bars) / section_count).max(1);

    let mut gesture_rng = rng_for(seed, "toccata-gesture");
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut tempo_sections: Vec<(Tick, f64)> = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;

    let mut cursor: Tick = 0;
    for section in 0..section_count {
        if cursor >= total_ticks {
            break;
        }
        let is_last = section + 1 == section_count;
        let end = if is_last {
            total_ticks
        } else {
            (cursor + Tick::from(bars_per) * TICKS_PER_BAR).min(total_ticks)
        };

        if section % 2 == 0 {
            // Gesture over a pedal, fermata chord at the close.
            let run_end = end.saturating_sub(TICKS_PER_BEAT).max(cursor);
            notes.extend(gesture_run(
                key,
                cursor,
                run_end,
                &registers[0],
                &mut gesture_rng,
            ));
            if num_voices > 1 {
                notes.extend(pedal_notes(
                    key,
                    cursor,
                    run_end,
                    bass_voice,
                    &registers[bass_voice as usize],
                ));
            }
            if run_end < end {
                let event = timeline.get_at(run_end);
                notes.extend(pause_chord(&event, run_end, num_voices, &registers));
            }
            if !is_last {
                let section_key = tonal_plan.key_at_tick(end);
                cadences.push(CadencePoint {
                    tick: end,
                    cadence: CadenceType::Half,
                    key: section_key,
                });
                timeline.apply_cadence(
                    CadenceType::Half,
                    section_key,
                    end.saturating_sub(2 * TICKS_PER_BEAT),
                    end,
                );
            }
            tempo_sections.push((cursor, 0.08));
        } else {
            let events: Vec<HarmonicEvent> = timeline.range(cursor, end).to_vec();
            notes.extend(figure_notes(
                &events,
                num_voices,
                &registers,
                cfg.character,
                &mut prev_voicing,
            ));
            tempo_sections.push((cursor, 0.0));
        }
        cursor = end;
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
        form: "toccata",
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
        base_bpm: base_bpm("toccata") * character_scale(cfg.character),
    };
    Ok(finish(out, PassTuning::default()))
}

//! The fugue pipeline.
//!
//! Exposition from the subject machinery, then alternating episodes
//! and middle entries per develop pair, an optional stretto, and a
//! coda with the final cadence. Episodes sequence the subject head;
//! middle entries restate the subject in the key the tonal plan has
//! reached.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::FugueConfig;

use crate::harmony::{CadencePoint, CadenceType};
use crate::rng::rng_for;
use crate::structure::{FugueStructure, Section, SectionKind};
use crate::subject::{build_exposition, generate_subject, restate_subject, Subject};
use crate::tempo::{base_bpm, character_scale, section_offset};
use crate::tonal::{generate_tonal_plan, Phase, TonalPlan};
use crate::types::{
    Key, NoteEvent, NoteSource, Provenance, Tick, TransformStep, VoiceRange, TICKS_PER_BAR,
    TICKS_PER_BEAT,
};

use super::{
    empty_score, finish, place_pc, registers_for, FormOutput, GenerateResult, PassTuning, Score,
};

/// Sequence the subject's opening motif downward through an episode.
fn episode_notes(
    subject: &Subject,
    key: Key,
    start: Tick,
    bars: u32,
    num_voices: u8,
    registers: &[VoiceRange],
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let motif: Vec<&NoteEvent> = subject.notes.iter().take(4).collect();
    if motif.is_empty() {
        return Vec::new();
    }
    let mut notes = Vec::new();

    for bar in 0..bars {
        let bar_tick = start + Tick::from(bar) * TICKS_PER_BAR;
        // Alternate the stating voice; step the motif down one scale
        // tone per bar.
        let voice = (bar % u32::from(num_voices.max(1))) as u8;
        let range = registers
            .get(voice as usize)
            .copied()
            .unwrap_or(VoiceRange { low: 36, high: 84 });
        let mut tick = bar_tick;
        for n in &motif {
            if tick + n.duration > bar_tick + TICKS_PER_BAR {
                break;
            }
            let mut pitch = n.pitch;
            for _ in 0..bar {
                pitch = key.nearest_scale_tone(pitch, -1);
            }
            let pitch = range.clamp(pitch);
            let mut ev = NoteEvent::new(tick, n.duration, pitch, voice, NoteSource::SequenceNote)
                .with_provenance(Provenance::new(pitch, tick));
            ev.record(TransformStep::Sequence);
            notes.push(ev);
            tick += n.duration;
        }
        // Fill the rest of the bar with a free connecting line.
        while tick < bar_tick + TICKS_PER_BAR {
            let dur = TICKS_PER_BEAT.min(bar_tick + TICKS_PER_BAR - tick);
            let anchor = notes.last().map(|n: &NoteEvent| n.pitch).unwrap_or(60);
            let dir: i8 = if rng.gen_bool(0.5) { 1 } else { -1 };
            let pitch = range.clamp(key.nearest_scale_tone(anchor, dir));
            notes.push(NoteEvent::new(tick, dur, pitch, voice, NoteSource::Episode));
            tick += dur;
        }
    }
    notes
}

/// Restate the subject in `key` in one voice with sustained support
/// in the others.
fn middle_entry_notes(
    subject: &Subject,
    key: Key,
    start: Tick,
    voice: u8,
    entry_number: u8,
    num_voices: u8,
    registers: &[VoiceRange],
) -> Vec<NoteEvent> {
    let mut notes = restate_subject(subject, key, start, voice, entry_number);
    if let Some(range) = registers.get(voice as usize) {
        octave_place(&mut notes, range);
    }
    // Other voices hold tonic or dominant support.
    for other in 0..num_voices {
        if other == voice {
            continue;
        }
        let Some(range) = registers.get(other as usize) else {
            continue;
        };
        let pc = if other % 2 == 0 {
            key.tonic
        } else {
            key.dominant_pc()
        };
        let pitch = place_pc(range, pc);
        let mut tick = start;
        while tick < start + subject.length_ticks {
            let dur = (2 * TICKS_PER_BEAT).min(start + subject.length_ticks - tick);
            notes.push(NoteEvent::new(
                tick,
                dur,
                pitch,
                other,
                NoteSource::FreeCounterpoint,
            ));
            tick += dur;
        }
    }
    notes
}

/// Overlapping entries at half the subject spacing.
fn stretto_notes(
    subject: &Subject,
    key: Key,
    start: Tick,
    num_voices: u8,
    registers: &[VoiceRange],
) -> (Vec<NoteEvent>, Tick) {
    let spacing = (subject.length_ticks / 2).max(TICKS_PER_BEAT);
    let mut notes = Vec::new();
    let mut last_end = start;
    for voice in 0..num_voices {
        let tick = start + Tick::from(voice) * spacing;
        let mut entry = restate_subject(subject, key, tick, voice, voice + 1);
        if let Some(range) = registers.get(voice as usize) {
            octave_place(&mut entry, range);
        }
        last_end = last_end.max(tick + subject.length_ticks);
        notes.extend(entry);
    }
    // Round the section out to a bar boundary.
    let end = last_end + (TICKS_PER_BAR - last_end % TICKS_PER_BAR) % TICKS_PER_BAR;
    (notes, end)
}

/// Final tonic close: dominant-to-tonic bass plus a held chord.
fn coda_notes(key: Key, start: Tick, end: Tick, num_voices: u8, registers: &[VoiceRange]) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let bass_voice = num_voices.saturating_sub(1);
    if let Some(range) = registers.get(bass_voice as usize) {
        let dominant = place_pc(range, key.dominant_pc());
        let tonic = place_pc(range, key.tonic);
        notes.push(NoteEvent::new(
            start,
            TICKS_PER_BEAT,
            dominant,
            bass_voice,
            NoteSource::FinalCadence,
        ));
        notes.push(NoteEvent::new(
            start + TICKS_PER_BEAT,
            end - start - TICKS_PER_BEAT,
            tonic,
            bass_voice,
            NoteSource::FinalCadence,
        ));
    }
    // Upper voices close on tonic-triad tones. The third is always
    // major: minor endings take the Picardy third.
    let third = (key.tonic + 4) % 12;
    let tones = [key.tonic, third, key.dominant_pc()];
    for voice in 0..bass_voice {
        let Some(range) = registers.get(voice as usize) else {
            continue;
        };
        let pc = tones[voice as usize % tones.len()];
        let pitch = place_pc(range, pc);
        notes.push(NoteEvent::new(
            start + TICKS_PER_BEAT,
            end - start - TICKS_PER_BEAT,
            pitch,
            voice,
            NoteSource::Coda,
        ));
    }
    notes
}

fn octave_place(notes: &mut [NoteEvent], range: &VoiceRange) {
    if notes.is_empty() {
        return;
    }
    let mean = notes.iter().map(|n| i32::from(n.pitch)).sum::<i32>() / notes.len() as i32;
    let mut shift = 0i32;
    let center = i32::from(range.center());
    while mean + shift < center - 6 {
        shift += 12;
    }
    while mean + shift > center + 6 {
        shift -= 12;
    }
    if shift != 0 {
        for n in notes.iter_mut() {
            n.pitch = (i32::from(n.pitch) + shift).clamp(0, 127) as u8;
            n.record(TransformStep::OctaveAdjust);
        }
    }
}

pub fn generate_fugue(cfg: &FugueConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.subject_bars == 0 {
        return Ok(empty_score("fugue", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);

    // Material.
    let mut subject_rng = rng_for(seed, "fugue-subject");
    let subject = generate_subject(key, u32::from(cfg.subject_bars), cfg.character, &mut subject_rng);
    let mut expo_rng = rng_for(seed, "fugue-exposition");
    let exposition = build_exposition(&subject, num_voices, &registers, cfg.character, &mut expo_rng);

    // Section layout.
    let episode_len = Tick::from(cfg.episode_bars.max(1)) * TICKS_PER_BAR;
    let entry_len = subject.length_ticks;
    let coda_len = 2 * TICKS_PER_BAR;
    let stretto_reserve = if cfg.stretto {
        let spacing = (entry_len / 2).max(TICKS_PER_BEAT);
        let raw = Tick::from(num_voices - 1) * spacing + entry_len;
        raw + (TICKS_PER_BAR - raw % TICKS_PER_BAR) % TICKS_PER_BAR
    } else {
        0
    };
    let develop_pairs = Tick::from(cfg.develop_pairs.max(1));
    let total_ticks = exposition.end_tick
        + develop_pairs * (episode_len + entry_len)
        + stretto_reserve
        + coda_len;

    // Plan.
    let mut tonal_rng = rng_for(seed, "fugue-tonal");
    let tonal_plan: TonalPlan = generate_tonal_plan(key, total_ticks, &mut tonal_rng);
    let mut timeline = tonal_plan.to_detailed_timeline(total_ticks);

    let mut structure = FugueStructure::new();
    structure.add_section(Section {
        kind: SectionKind::Exposition,
        phase: Phase::Establish,
        start_tick: 0,
        end_tick: exposition.end_tick,
        key,
    })?;

    let mut notes = exposition.notes.clone();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut episode_rng = rng_for(seed, "fugue-episodes");
    let mut cursor = exposition.end_tick;
    let mut entry_number = num_voices;

    for pair in 0..cfg.develop_pairs.max(1) {
        let section_key = tonal_plan.key_at_tick(cursor);

        structure.add_section(Section {
            kind: SectionKind::Episode,
            phase: Phase::Develop,
            start_tick: cursor,
            end_tick: cursor + episode_len,
            key: section_key,
        })?;
        notes.extend(episode_notes(
            &subject,
            section_key,
            cursor,
            u32::from(cfg.episode_bars.max(1)),
            num_voices,
            &registers,
            &mut episode_rng,
        ));
        cursor += episode_len;

        // A half cadence closes each episode.
        cadences.push(CadencePoint {
            tick: cursor,
            cadence: CadenceType::Half,
            key: section_key,
        });
        timeline.apply_cadence(
            CadenceType::Half,
            section_key,
            cursor.saturating_sub(2 * TICKS_PER_BEAT),
            cursor,
        );

        let entry_key = tonal_plan.key_at_tick(cursor);
        let voice = (u32::from(pair) % u32::from(num_voices)) as u8;
        entry_number += 1;
        structure.add_section(Section {
            kind: SectionKind::MiddleEntry,
            phase: Phase::Develop,
            start_tick: cursor,
            end_tick: cursor + entry_len,
            key: entry_key,
        })?;
        notes.extend(middle_entry_notes(
            &subject,
            entry_key,
            cursor,
            voice,
            entry_number,
            num_voices,
            &registers,
        ));
        cursor += entry_len;
    }

    if cfg.stretto {
        let (stretto, stretto_end) = stretto_notes(&subject, key, cursor, num_voices, &registers);
        structure.add_section(Section {
            kind: SectionKind::Stretto,
            phase: Phase::Develop,
            start_tick: cursor,
            end_tick: stretto_end.min(total_ticks - coda_len),
            key,
        })?;
        notes.extend(stretto);
        cursor = stretto_end.min(total_ticks - coda_len);
    }

    let coda_start = total_ticks - coda_len;
    structure.add_section(Section {
        kind: SectionKind::Coda,
        phase: Phase::Resolve,
        start_tick: coda_start.max(cursor),
        end_tick: total_ticks,
        key,
    })?;
    notes.extend(coda_notes(
        key,
        coda_start.max(cursor),
        total_ticks,
        num_voices,
        &registers,
    ));

    // Final cadence: Picardy close in minor, perfect in major.
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

    let tempo_sections: Vec<(Tick, f64)> = structure
        .sections()
        .iter()
        .map(|s| (s.start_tick, section_offset(s.kind)))
        .collect();

    let out = FormOutput {
        form: "fugue",
        key,
        num_voices,
        seed,
        attempts: 1,
        instrument: cfg.instrument,
        notes,
        timeline,
        tonal_plan,
        structure,
        cadences,
        tempo_sections,
        base_bpm: base_bpm("fugue") * character_scale(cfg.character),
    };
    let score: Score = finish(out, PassTuning::default());
    Ok(score)
}

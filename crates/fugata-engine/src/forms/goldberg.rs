//! The Goldberg pipeline.
//!
//! Everything sits on the 32-bar grid: the aria states a sarabande
//! melody over the grid bass, each variation re-figures the same
//! harmony, every third variation runs as a canon at the bar, and the
//! aria may return da capo. Grid cadences land at bars 8, 16, 24, 32
//! of every section.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::GoldbergConfig;

use crate::figuration::{apply_figuration, select_template};
use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, Chord, ChordDegree,
    ChordQuality, ChordVoicing, HarmonicEvent, HarmonicTimeline,
};
use crate::rng::rng_for_indexed;
use crate::structure::{FugueStructure, GoldbergGrid};
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::TonalPlan;
use crate::types::{
    Key, NoteEvent, NoteSource, Tick, VoiceRange, TICKS_PER_BAR, TICKS_PER_BEAT,
};

use super::{empty_score, finish, place_pc, registers_for, FormOutput, GenerateResult, PassTuning};

/// Diatonic triad quality for a grid degree.
fn triad_quality(degree: ChordDegree, key: Key) -> ChordQuality {
    if degree == ChordDegree::VofV {
        return ChordQuality::Major;
    }
    if key.minor {
        match degree {
            ChordDegree::I | ChordDegree::IV => ChordQuality::Minor,
            ChordDegree::II => ChordQuality::Diminished,
            _ => ChordQuality::Major,
        }
    } else {
        match degree {
            ChordDegree::II | ChordDegree::III | ChordDegree::VI => ChordQuality::Minor,
            ChordDegree::VII => ChordQuality::Diminished,
            _ => ChordQuality::Major,
        }
    }
}

/// One grid pass realized as harmonic events, one bar per chord.
fn grid_timeline_section(
    grid: &GoldbergGrid,
    key: Key,
    offset: Tick,
    timeline: &mut HarmonicTimeline,
) -> Result<(), crate::harmony::TimelineError> {
    for bar in &grid.bars {
        let tick = offset + Tick::from(bar.bar) * TICKS_PER_BAR;
        let chord = Chord::from_degree(bar.bass_degree, triad_quality(bar.bass_degree, key), key);
        timeline.push(HarmonicEvent::new(tick, tick + TICKS_PER_BAR, key, chord))?;
    }
    Ok(())
}

/// The grid bass: one note per bar on the grid degree.
fn grid_bass(
    events: &[HarmonicEvent],
    bass_voice: u8,
    range: &VoiceRange,
) -> Vec<NoteEvent> {
    events
        .iter()
        .map(|e| {
            NoteEvent::new(
                e.tick,
                e.end_tick - e.tick,
                place_pc(range, e.bass_pitch % 12),
                bass_voice,
                NoteSource::GoldbergBass,
            )
        })
        .collect()
}

/// The aria: a sarabande melody (half plus quarter per bar) on chord
/// tones, held inner harmony, grid bass below.
fn aria_notes(
    events: &[HarmonicEvent],
    num_voices: u8,
    registers: &[VoiceRange],
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;
    for event in events {
        let voicing = match &prev_voicing {
            Some(p) => smooth_voice_leading(p, event, num_voices, registers),
            None => voice_chord(event, num_voices, registers),
        };
        if let Some(&soprano) = voicing.pitches.first() {
            // Sarabande accent: the long value sits on beat two.
            notes.push(NoteEvent::new(
                event.tick,
                TICKS_PER_BEAT,
                soprano,
                0,
                NoteSource::GoldbergAria,
            ));
            let second = event.key.nearest_scale_tone(soprano, 1);
            notes.push(NoteEvent::new(
                event.tick + TICKS_PER_BEAT,
                2 * TICKS_PER_BEAT,
                second,
                0,
                NoteSource::GoldbergAria,
            ));
            notes.push(NoteEvent::new(
                event.tick + 3 * TICKS_PER_BEAT,
                TICKS_PER_BEAT,
                soprano,
                0,
                NoteSource::GoldbergAria,
            ));
        }
        for (v, &pitch) in voicing.pitches.iter().enumerate().skip(1) {
            if v as u8 + 1 >= num_voices {
                break;
            }
            notes.push(NoteEvent::new(
                event.tick,
                event.end_tick - event.tick,
                pitch,
                v as u8,
                NoteSource::Texture,
            ));
        }
        prev_voicing = Some(voicing);
    }
    notes
}

/// A figured variation over the grid harmony.
fn figura_notes(
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
        let mut beat = event.tick;
        while beat < event.end_tick {
            let template = select_template(rng, upper_voices);
            let mut beat_notes =
                apply_figuration(&template, &voicing, event, registers, beat, prev_soprano);
            for n in beat_notes.iter_mut() {
                n.source = NoteSource::GoldbergFigura;
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
        prev_voicing = Some(voicing);
    }
    notes
}

/// A canon at the bar over the grid: the leader walks chord and scale
/// tones, the follower repeats the line one bar later a voice lower.
fn canon_notes(
    events: &[HarmonicEvent],
    registers: &[VoiceRange],
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let Some(range) = registers.first() else {
        return Vec::new();
    };
    let mut leader: Vec<NoteEvent> = Vec::new();
    let mut pitch = 0u8;
    for event in events {
        let voicing = voice_chord(event, 1, registers);
        let anchor = voicing.pitches.first().copied().unwrap_or(72);
        if pitch == 0 {
            pitch = anchor;
        }
        let mut tick = event.tick;
        while tick < event.end_tick {
            let dur = (TICKS_PER_BEAT / 2).min(event.end_tick - tick);
            leader.push(NoteEvent::new(tick, dur, pitch, 0, NoteSource::CanonLeader));
            let dir: i8 = if pitch > anchor {
                -1
            } else if pitch < anchor {
                1
            } else if rng.gen_bool(0.5) {
                1
            } else {
                -1
            };
            pitch = range.clamp(event.key.nearest_scale_tone(pitch, dir));
            tick += dur;
        }
    }
    let span_end = events.last().map_or(0, |e| e.end_tick);
    let mut notes = leader.clone();
    for n in &leader {
        let start = n.start_tick + TICKS_PER_BAR;
        if start >= span_end {
            break;
        }
        let mut follower = *n;
        follower.start_tick = start;
        follower.duration = follower.duration.min(span_end - start);
        follower.voice = 1;
        follower.pitch = follower.pitch.saturating_sub(12);
        follower.source = NoteSource::CanonFollower;
        notes.push(follower);
    }
    notes
}

pub fn generate_goldberg(cfg: &GoldbergConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 {
        return Ok(empty_score("goldberg", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let bass_voice = num_voices - 1;
    let upper_voices = num_voices - 1;

    let grid = GoldbergGrid::standard();
    let section_ticks = Tick::from(grid.bars.len() as u32) * TICKS_PER_BAR;
    let variations = u32::from(cfg.variations);
    let da_capo = u32::from(cfg.aria_da_capo);
    let section_count = 1 + variations + da_capo;
    let total_ticks = section_ticks * Tick::from(section_count);

    let mut timeline = HarmonicTimeline::new();
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mut tempo_sections: Vec<(Tick, f64)> = Vec::new();

    for section in 0..section_count {
        let offset = Tick::from(section) * section_ticks;
        grid_timeline_section(&grid, key, offset, &mut timeline)?;
        let events: Vec<HarmonicEvent> = timeline.range(offset, offset + section_ticks).to_vec();

        let is_aria = section == 0 || (cfg.aria_da_capo && section + 1 == section_count);
        if is_aria {
            notes.extend(aria_notes(&events, num_voices, &registers));
            tempo_sections.push((offset, 0.0));
        } else {
            let variation = section; // 1-based within the cycle
            let mut rng = rng_for_indexed(seed, "goldberg-variation", variation);
            if variation % 3 == 0 && num_voices >= 3 {
                notes.extend(canon_notes(&events, &registers, &mut rng));
            } else if upper_voices > 0 {
                notes.extend(figura_notes(&events, upper_voices, &registers, &mut rng));
            }
            tempo_sections.push((offset, if variation % 3 == 0 { -0.04 } else { 0.06 }));
        }
        if num_voices > 1 || !is_aria {
            notes.extend(grid_bass(
                &events,
                bass_voice,
                &registers[bass_voice as usize],
            ));
        }

        // Grid cadences, shifted into this section.
        for bar in &grid.bars {
            let Some(cadence) = bar.cadence else { continue };
            let boundary = offset + Tick::from(bar.bar + 1) * TICKS_PER_BAR;
            let is_final = boundary == total_ticks;
            let cadence = if is_final && key.minor {
                CadenceType::PicardyThird
            } else {
                cadence
            };
            cadences.push(CadencePoint {
                tick: boundary,
                cadence,
                key,
            });
            timeline.apply_cadence(
                cadence,
                key,
                boundary.saturating_sub(2 * TICKS_PER_BEAT),
                boundary,
            );
        }
    }

    let out = FormOutput {
        form: "goldberg",
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
        base_bpm: base_bpm("goldberg") * character_scale(cfg.character),
    };
    Ok(finish(out, PassTuning::default()))
}

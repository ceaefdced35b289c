//! The prelude pipeline.
//!
//! A figuration study: the tonal plan is rendered into a detailed
//! per-beat timeline, each beat realized from the template library
//! over a smoothly-led voicing, then passing and neighbor tones are
//! injected bar by bar with rising intensity toward the middle.

use fugata_spec::PreludeConfig;

use crate::figuration::{apply_figuration, inject_non_chord_tones, select_template};
use crate::harmony::{
    smooth_voice_leading, voice_chord, CadencePoint, CadenceType, ChordVoicing,
};
use crate::rng::rng_for;
use crate::structure::FugueStructure;
use crate::tempo::{base_bpm, character_scale};
use crate::tonal::generate_tonal_plan;
use crate::types::{Key, NoteEvent, Tick, TICKS_PER_BAR, TICKS_PER_BEAT};

use super::{empty_score, finish, registers_for, FormOutput, GenerateResult, PassTuning};

pub fn generate_prelude(cfg: &PreludeConfig, seed: u32) -> GenerateResult {
    let key = Key::from_config(cfg.key, cfg.mode);
    if cfg.voices == 0 || cfg.bars == 0 {
        return Ok(empty_score("prelude", key, seed));
    }
    let num_voices = cfg.voices;
    let registers = registers_for(num_voices, cfg.instrument);
    let total_ticks = Tick::from(cfg.bars) * TICKS_PER_BAR;

    let mut plan_rng = rng_for(seed, "prelude-plan");
    let tonal_plan = generate_tonal_plan(key, total_ticks, &mut plan_rng);
    let mut timeline = tonal_plan.to_detailed_timeline(total_ticks);

    // Cadences first, so the figuration sounds them.
    let mut cadences: Vec<CadencePoint> = Vec::new();
    let mid = (total_ticks / 2) - (total_ticks / 2) % TICKS_PER_BAR;
    if mid > 0 && mid < total_ticks {
        let mid_key = tonal_plan.key_at_tick(mid);
        cadences.push(CadencePoint {
            tick: mid,
            cadence: CadenceType::Half,
            key: mid_key,
        });
        timeline.apply_cadence(
            CadenceType::Half,
            mid_key,
            mid.saturating_sub(2 * TICKS_PER_BEAT),
            mid,
        );
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

    // One template per beat over a smoothly-led voicing chain.
    let mut fig_rng = rng_for(seed, "prelude-figuration");
    let mut notes: Vec<NoteEvent> = Vec::new();
    let mut prev_voicing: Option<ChordVoicing> = None;
    let mut prev_soprano: Option<u8> = None;
    for event in timeline.events().to_vec() {
        let voicing = match &prev_voicing {
            Some(p) => smooth_voice_leading(p, &event, num_voices, &registers),
            None => voice_chord(&event, num_voices, &registers),
        };
        let mut beat = event.tick;
        while beat < event.end_tick {
            let template = select_template(&mut fig_rng, num_voices);
            let beat_notes = apply_figuration(
                &template,
                &voicing,
                &event,
                &registers,
                beat,
                prev_soprano,
            );
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

    // Ornament bar by bar: the middle of the piece runs densest.
    let mut nct_rng = rng_for(seed, "prelude-nct");
    notes.sort_by_key(|n| (n.start_tick, n.voice));
    let mut lo = 0usize;
    for bar in 0..u32::from(cfg.bars) {
        let bar_end = Tick::from(bar + 1) * TICKS_PER_BAR;
        let hi = notes[lo..]
            .iter()
            .position(|n| n.start_tick >= bar_end)
            .map_or(notes.len(), |p| lo + p);
        if hi > lo {
            let progress = f64::from(bar) / f64::from(u32::from(cfg.bars).max(1));
            inject_non_chord_tones(
                &mut notes[lo..hi],
                &timeline,
                cfg.nct_probability,
                progress,
                &mut nct_rng,
            );
        }
        lo = hi;
    }

    let out = FormOutput {
        form: "prelude",
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
        tempo_sections: vec![(0, 0.0)],
        base_bpm: base_bpm("prelude") * character_scale(cfg.character),
    };
    Ok(finish(out, PassTuning::default()))
}

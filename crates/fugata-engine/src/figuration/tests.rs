//! Tests for the figuration engine.

use pretty_assertions::assert_eq;

use crate::harmony::{voice_chord, Chord, ChordDegree, HarmonicEvent};
use crate::rng::rng_for;
use crate::types::{default_registers, Key, NoteSource, TICKS_PER_BEAT};

use super::*;

fn c_major_event() -> HarmonicEvent {
    let key = Key::new(0, false);
    HarmonicEvent::new(0, TICKS_PER_BEAT, key, Chord::diatonic(ChordDegree::I, key))
}

#[test]
fn library_templates_span_one_beat() {
    for template in template_library() {
        assert!(!template.steps.is_empty(), "{} empty", template.name);
        for step in &template.steps {
            assert!(
                step.relative_tick + step.duration <= TICKS_PER_BEAT,
                "{} step exceeds the beat",
                template.name
            );
            assert!(step.scale_offset.abs() <= 1);
        }
    }
}

#[test]
fn select_template_respects_voice_span() {
    let mut rng = rng_for(42, "figuration");
    for _ in 0..32 {
        let template = select_template(&mut rng, 3);
        assert!(template.voice_span() <= 3, "{}", template.name);
    }
}

#[test]
fn apply_emits_chord_tones_in_register() {
    let event = c_major_event();
    let registers = default_registers(3);
    let voicing = voice_chord(&event, 3, &registers);
    for template in template_library().iter().filter(|t| t.voice_span() <= 3) {
        let notes = apply_figuration(template, &voicing, &event, &registers, 0, None);
        assert!(!notes.is_empty(), "{}", template.name);
        for note in &notes {
            assert_eq!(note.source, NoteSource::PreludeFiguration);
            assert!(event.key.contains(note.pitch), "{} off-scale", note.pitch);
            let range = &registers[note.voice as usize];
            assert!(range.contains(note.pitch));
        }
    }
}

#[test]
fn melodic_memory_rejects_repetition() {
    let event = c_major_event();
    let registers = default_registers(3);
    let voicing = voice_chord(&event, 3, &registers);
    let template = template_library()
        .into_iter()
        .find(|t| t.name == "alberti")
        .unwrap();
    // Force the previous soprano onto this beat's first sounding pitch
    // for voice 0 at the boundary. Alberti starts with voice 2, so use
    // the first voice-0 step's pitch check indirectly: with and without
    // memory the outputs must differ only when a repetition existed.
    let plain = apply_figuration(&template, &voicing, &event, &registers, 0, None);
    let boundary_pitch = plain
        .iter()
        .find(|n| n.voice == 0 && n.start_tick == 0)
        .map(|n| n.pitch);
    if let Some(p) = boundary_pitch {
        let with_memory = apply_figuration(&template, &voicing, &event, &registers, 0, Some(p));
        let repeated = with_memory
            .iter()
            .find(|n| n.voice == 0 && n.start_tick == 0)
            .map(|n| n.pitch);
        assert_ne!(repeated, Some(p), "repetition not avoided");
    }
}

#[test]
fn nct_injection_respects_probability_zero_and_beat_starts() {
    let event = c_major_event();
    let registers = default_registers(3);
    let voicing = voice_chord(&event, 3, &registers);
    let template = template_library()
        .into_iter()
        .find(|t| t.name == "broken_chord")
        .unwrap();
    let mut notes = apply_figuration(&template, &voicing, &event, &registers, 0, None);
    let key = Key::new(0, false);
    let timeline = {
        let mut t = crate::harmony::HarmonicTimeline::new();
        t.push(HarmonicEvent::new(
            0,
            TICKS_PER_BEAT,
            key,
            Chord::diatonic(ChordDegree::I, key),
        ))
        .unwrap();
        t
    };
    let mut rng = rng_for(1, "nct");
    let modified = inject_non_chord_tones(&mut notes, &timeline, 0.0, 0.5, &mut rng);
    assert_eq!(modified, 0);
    // Beat-start notes are never altered even at probability 1.
    let mut rng = rng_for(1, "nct");
    let before: Vec<u8> = notes
        .iter()
        .filter(|n| n.start_tick == 0)
        .map(|n| n.pitch)
        .collect();
    inject_non_chord_tones(&mut notes, &timeline, 1.0, 0.5, &mut rng);
    let after: Vec<u8> = notes
        .iter()
        .filter(|n| n.start_tick == 0)
        .map(|n| n.pitch)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn nct_injection_marks_sources() {
    let event = c_major_event();
    let registers = default_registers(3);
    let voicing = voice_chord(&event, 3, &registers);
    let timeline = {
        let mut t = crate::harmony::HarmonicTimeline::new();
        t.push(c_major_event()).unwrap();
        t
    };
    let template = template_library()
        .into_iter()
        .find(|t| t.name == "broken_chord")
        .unwrap();
    let mut notes = apply_figuration(&template, &voicing, &event, &registers, 0, None);
    let mut rng = rng_for(9, "nct");
    let modified = inject_non_chord_tones(&mut notes, &timeline, 1.0, 0.1, &mut rng);
    let tagged = notes
        .iter()
        .filter(|n| n.source == NoteSource::ChromaticPassing)
        .count();
    assert_eq!(modified, tagged);
}

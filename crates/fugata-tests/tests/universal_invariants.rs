//! Universal structural invariants over many `(form, seed)` pairs.
//!
//! Every generated score, whatever the form and seed, must satisfy the
//! same boundary, ordering, protection, and tempo constraints.

use fugata_engine::harmony::{voice_chord, Chord, ChordDegree, ChordQuality, HarmonicEvent};
use fugata_engine::structure::{
    create_standard_variation_plan, validate_variation_plan, VariationRole, VariationType,
};
use fugata_engine::tempo::{MAX_BPM, MIN_BPM};
use fugata_engine::tonal::Phase;
use fugata_engine::types::{Key, ModifiedBy, VoiceRange};
use fugata_engine::{NoteEvent, NoteSource, ProtectionLevel, Score, TICKS_PER_BAR};
use fugata_spec::ScoreSpec;
use fugata_tests::fixtures;

const SEEDS: [u32; 2] = [42, 123];

fn all_specs(seed: u32) -> Vec<ScoreSpec> {
    vec![
        fixtures::fugue_spec("inv-fugue", seed),
        fixtures::chaconne_spec("inv-chaconne", seed),
        fixtures::prelude_spec("inv-prelude", seed),
        fixtures::toccata_spec("inv-toccata", seed),
        fixtures::fantasia_spec("inv-fantasia", seed),
        fixtures::passacaglia_spec("inv-passacaglia", seed),
        fixtures::goldberg_spec("inv-goldberg", seed),
    ]
}

fn all_scores() -> Vec<Score> {
    let mut scores = Vec::new();
    for seed in SEEDS {
        for spec in all_specs(seed) {
            let score = fugata_engine::generate(&spec)
                .unwrap_or_else(|e| panic!("{} seed {} failed: {}", spec.name, seed, e));
            scores.push(score);
        }
    }
    scores
}

fn notes_of(score: &Score) -> impl Iterator<Item = &NoteEvent> {
    score.tracks.iter().flat_map(|t| t.notes.iter())
}

#[test]
fn every_note_stays_inside_hard_bounds() {
    for score in all_scores() {
        for note in notes_of(&score) {
            assert!(note.duration > 0, "{}: zero-duration note", score.form);
            assert!(
                (1..=127).contains(&note.velocity),
                "{}: velocity {} out of range",
                score.form,
                note.velocity
            );
            assert!(
                note.voice < score.num_voices,
                "{}: voice {} >= {}",
                score.form,
                note.voice,
                score.num_voices
            );
        }
    }
}

#[test]
fn tracks_are_sorted_with_at_most_one_tick_of_overlap() {
    for score in all_scores() {
        for track in &score.tracks {
            for pair in track.notes.windows(2) {
                assert!(
                    pair[0].start_tick <= pair[1].start_tick,
                    "{}: track not sorted",
                    score.form
                );
                assert!(
                    pair[1].start_tick + 1 >= pair[0].end_tick(),
                    "{}: notes at {} and {} overlap",
                    score.form,
                    pair[0].start_tick,
                    pair[1].start_tick
                );
            }
        }
    }
}

#[test]
fn protected_notes_are_never_repitched_by_repair_passes() {
    let repitch = ModifiedBy::PARALLEL_REPAIR
        | ModifiedBy::CHORD_SNAP
        | ModifiedBy::LEAP_RESOLUTION
        | ModifiedBy::REPEATED_NOTE;
    for score in all_scores() {
        for note in notes_of(&score) {
            let protection = note.protection();
            if protection == ProtectionLevel::Flexible {
                continue;
            }
            // Cadence shaping freezes previously-flexible notes; their
            // flags predate the freeze.
            if note.source == NoteSource::CadenceApproach {
                continue;
            }
            assert!(
                !note.modified_by.contains(repitch),
                "{}: {:?} note at {} was repitched ({:?})",
                score.form,
                protection,
                note.start_tick,
                note.modified_by
            );
            // Range repair may octave-shift structural material but
            // never the immutable layer.
            if matches!(
                protection,
                ProtectionLevel::Immutable | ProtectionLevel::Architectural
            ) {
                assert!(
                    !note.modified_by.contains(ModifiedBy::OCTAVE_ADJUST),
                    "{}: immutable note at {} octave-shifted",
                    score.form,
                    note.start_tick
                );
            }
        }
    }
}

#[test]
fn tonal_plans_never_regress_and_end_at_home() {
    for score in all_scores() {
        let modulations = &score.tonal_plan.modulations;
        for pair in modulations.windows(2) {
            assert!(
                pair[0].phase <= pair[1].phase,
                "{}: phase regression at tick {}",
                score.form,
                pair[1].tick
            );
        }
        if let Some(last) = modulations.last() {
            assert_eq!(
                last.key, score.tonal_plan.home,
                "{}: plan does not return home",
                score.form
            );
        }
    }
}

#[test]
fn fugue_sections_are_ordered_and_non_empty() {
    for seed in SEEDS {
        let score = fugata_engine::generate(&fixtures::fugue_spec("inv-sections", seed)).unwrap();
        let sections = &score.sections;
        assert!(!sections.is_empty());
        assert_eq!(sections[0].start_tick, 0);
        assert_eq!(sections[0].phase, Phase::Establish);
        for section in sections {
            assert!(section.end_tick > section.start_tick);
        }
        for pair in sections.windows(2) {
            assert!(pair[1].start_tick >= pair[0].end_tick);
        }
    }
}

#[test]
fn standard_variation_plan_passes_its_own_validation() {
    let plan = create_standard_variation_plan(Key::new(2, true));
    validate_variation_plan(&plan).unwrap();

    let accumulate = plan
        .variations
        .iter()
        .filter(|v| v.role == VariationRole::Accumulate)
        .count();
    assert_eq!(accumulate, 3);

    let last = plan.variations.last().unwrap();
    assert_eq!(last.role, VariationRole::Resolve);
    assert_eq!(last.allowed, vec![VariationType::Theme]);
}

#[test]
fn chord_voicings_never_cross_voices() {
    let key = Key::new(0, false);
    let registers: Vec<VoiceRange> = (0..4u8)
        .map(|v| VoiceRange {
            low: 36 + 12 * (3 - v),
            high: 60 + 12 * (3 - v),
        })
        .collect();
    for degree in [ChordDegree::I, ChordDegree::IV, ChordDegree::V, ChordDegree::VI] {
        let chord = Chord::from_degree(degree, ChordQuality::Major, key);
        let event = HarmonicEvent::new(0, TICKS_PER_BAR, key, chord);
        let voicing = voice_chord(&event, 4, &registers);
        assert_eq!(voicing.pitches.len(), 4);
        for pair in voicing.pitches.windows(2) {
            assert!(
                pair[0] >= pair[1],
                "{:?}: voices cross in {:?}",
                degree,
                voicing.pitches
            );
        }
    }
}

#[test]
fn tempo_maps_are_sorted_unique_and_in_band() {
    for score in all_scores() {
        let events = score.tempo.events();
        assert!(!events.is_empty(), "{}: empty tempo map", score.form);
        for event in events {
            assert!(
                (MIN_BPM..=MAX_BPM).contains(&event.bpm),
                "{}: bpm {} out of band",
                score.form,
                event.bpm
            );
        }
        for pair in events.windows(2) {
            assert!(
                pair[0].tick < pair[1].tick,
                "{}: tempo events share tick {}",
                score.form,
                pair[1].tick
            );
        }
    }
}

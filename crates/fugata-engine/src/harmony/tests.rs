//! Tests for the harmonic model.

use pretty_assertions::assert_eq;

use crate::types::{default_registers, Key, TICKS_PER_BEAT};

use super::*;

fn c_major() -> Key {
    Key::new(0, false)
}

fn d_minor() -> Key {
    Key::new(2, true)
}

#[test]
fn degree_roots_in_c_major() {
    let key = c_major();
    assert_eq!(ChordDegree::I.root_pc(key, ChordQuality::Major), 0);
    assert_eq!(ChordDegree::IV.root_pc(key, ChordQuality::Major), 5);
    assert_eq!(ChordDegree::V.root_pc(key, ChordQuality::Dominant7), 7);
    assert_eq!(ChordDegree::VII.root_pc(key, ChordQuality::Diminished), 11);
    assert_eq!(ChordDegree::FlatII.root_pc(key, ChordQuality::Major), 1);
    // V/V in C is D.
    assert_eq!(ChordDegree::VofV.root_pc(key, ChordQuality::Major), 2);
}

#[test]
fn minor_iii_and_vii_use_natural_minor_degrees() {
    let key = d_minor();
    // III in D minor is F, VII (non-diminished) is the subtonic C.
    assert_eq!(ChordDegree::III.root_pc(key, ChordQuality::Major), 5);
    assert_eq!(ChordDegree::VII.root_pc(key, ChordQuality::Major), 0);
    assert_eq!(ChordDegree::FlatVII.root_pc(key, ChordQuality::Major), 0);
    // Leading-tone diminished still sits on C#.
    assert_eq!(ChordDegree::VII.root_pc(key, ChordQuality::Diminished), 1);
}

#[test]
fn chord_membership() {
    let chord = Chord::from_degree(ChordDegree::V, ChordQuality::Dominant7, c_major());
    assert!(chord.contains(67, c_major()));
    assert!(chord.contains(71, c_major()));
    assert!(chord.contains(65, c_major()));
    assert!(!chord.contains(60, c_major()));
    assert_eq!(chord.seventh_pc(c_major()), Some(5));
}

#[test]
fn timeline_rejects_overlap_and_empty_intervals() {
    let key = c_major();
    let chord = Chord::diatonic(ChordDegree::I, key);
    let mut timeline = HarmonicTimeline::new();
    timeline
        .push(HarmonicEvent::new(0, 480, key, chord))
        .unwrap();
    let overlap = timeline.push(HarmonicEvent::new(240, 960, key, chord));
    assert!(matches!(overlap, Err(TimelineError::Overlap { .. })));
    let empty = timeline.push(HarmonicEvent::new(960, 960, key, chord));
    assert!(matches!(empty, Err(TimelineError::EmptyInterval { .. })));
}

#[test]
fn timeline_lookup_uses_binary_search() {
    let key = c_major();
    let mut timeline = HarmonicTimeline::new();
    for beat in 0..16u64 {
        let degree = if beat % 2 == 0 {
            ChordDegree::I
        } else {
            ChordDegree::V
        };
        timeline
            .push(HarmonicEvent::new(
                beat * TICKS_PER_BEAT,
                (beat + 1) * TICKS_PER_BEAT,
                key,
                Chord::diatonic(degree, key),
            ))
            .unwrap();
    }
    assert_eq!(timeline.get_at(0).chord.degree, ChordDegree::I);
    assert_eq!(timeline.get_at(479).chord.degree, ChordDegree::I);
    assert_eq!(timeline.get_at(480).chord.degree, ChordDegree::V);
    assert_eq!(timeline.find_at(16 * TICKS_PER_BEAT), None);
    assert_eq!(timeline.range(0, 960).len(), 2);
}

#[test]
fn empty_timeline_defaults_to_tonic() {
    let timeline = HarmonicTimeline::new();
    let event = timeline.get_at(1234);
    assert_eq!(event.chord.degree, ChordDegree::I);
    assert!(event.covers(1234));
}

#[test]
fn perfect_cadence_rewrites_last_two_events() {
    let key = c_major();
    let mut timeline = HarmonicTimeline::new();
    for beat in 0..4u64 {
        timeline
            .push(HarmonicEvent::new(
                beat * TICKS_PER_BEAT,
                (beat + 1) * TICKS_PER_BEAT,
                key,
                Chord::diatonic(ChordDegree::VI, key),
            ))
            .unwrap();
    }
    timeline.apply_cadence(CadenceType::Perfect, key, 2 * TICKS_PER_BEAT, 4 * TICKS_PER_BEAT);
    let events = timeline.events();
    assert_eq!(events[2].chord.degree, ChordDegree::V);
    assert_eq!(events[2].chord.quality, ChordQuality::Dominant7);
    assert_eq!(events[3].chord.degree, ChordDegree::I);
    assert!(events[3].is_immutable);
}

#[test]
fn picardy_third_flips_final_quality_only() {
    let key = d_minor();
    let mut timeline = HarmonicTimeline::new();
    timeline
        .push(HarmonicEvent::new(
            0,
            TICKS_PER_BEAT,
            key,
            Chord::diatonic(ChordDegree::I, key),
        ))
        .unwrap();
    timeline.apply_cadence(CadenceType::PicardyThird, key, 0, TICKS_PER_BEAT);
    let last = timeline.events().last().unwrap();
    assert_eq!(last.chord.quality, ChordQuality::Major);
    assert_eq!(last.chord.degree, ChordDegree::I);
}

#[test]
fn voicing_never_crosses() {
    let key = c_major();
    let registers = default_registers(4);
    for degree in [ChordDegree::I, ChordDegree::IV, ChordDegree::V, ChordDegree::II] {
        let event = HarmonicEvent::new(0, 480, key, Chord::diatonic(degree, key));
        let voicing = voice_chord(&event, 4, &registers);
        assert_eq!(voicing.pitches.len(), 4);
        for pair in voicing.pitches.windows(2) {
            assert!(pair[0] >= pair[1], "crossing in {:?}", voicing.pitches);
        }
        // Every voiced pitch belongs to the chord.
        for p in &voicing.pitches {
            assert!(event.chord.contains(*p, key), "{} not in chord", p);
        }
    }
}

#[test]
fn smooth_voice_leading_avoids_parallel_perfects() {
    let key = c_major();
    let registers = default_registers(4);
    let first = HarmonicEvent::new(0, 480, key, Chord::diatonic(ChordDegree::I, key));
    let second = HarmonicEvent::new(480, 960, key, Chord::diatonic(ChordDegree::II, key));

    let a = voice_chord(&first, 4, &registers);
    let b = smooth_voice_leading(&a, &second, 4, &registers);
    assert_eq!(b.pitches.len(), 4);
    for pair in b.pitches.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    // No same-direction perfect parallels between any pair.
    for i in 0..4 {
        for j in (i + 1)..4 {
            let prev_int = (a.pitches[i] as i16 - a.pitches[j] as i16).unsigned_abs() % 12;
            let next_int = (b.pitches[i] as i16 - b.pitches[j] as i16).unsigned_abs() % 12;
            if (next_int == 0 || next_int == 7) && prev_int == next_int {
                let da = b.pitches[i] as i16 - a.pitches[i] as i16;
                let db = b.pitches[j] as i16 - a.pitches[j] as i16;
                assert!(
                    da == 0 || db == 0 || da.signum() != db.signum(),
                    "parallel {} between voices {} and {}",
                    next_int,
                    i,
                    j
                );
            }
        }
    }
}

#[test]
fn tension_orders_tonic_below_dominant() {
    let key = c_major();
    let tonic = Chord::diatonic(ChordDegree::I, key);
    let dom7 = Chord::from_degree(ChordDegree::V, ChordQuality::Dominant7, key);
    let dim7 = Chord::from_degree(ChordDegree::VII, ChordQuality::Diminished7, key);
    assert!(tension_score(&tonic) < tension_score(&dom7));
    assert!(tension_score(&dom7) < tension_score(&dim7));
    assert_eq!(classify_function(&tonic), HarmonicFunction::Tonic);
    assert_eq!(classify_function(&dom7), HarmonicFunction::Dominant);
}

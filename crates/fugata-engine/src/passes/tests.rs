use pretty_assertions::assert_eq;

use crate::harmony::{
    CadencePoint, CadenceType, Chord, ChordDegree, HarmonicEvent, HarmonicTimeline,
};
use crate::rng::rng_for;
use crate::types::{
    default_registers, Key, ModifiedBy, NoteEvent, NoteSource, Tick, TICKS_PER_BAR,
    TICKS_PER_BEAT,
};

use super::*;

fn c_major_timeline(bars: u32) -> HarmonicTimeline {
    let mut tl = HarmonicTimeline::new();
    let key = Key::new(0, false);
    let end = Tick::from(bars) * TICKS_PER_BAR;
    tl.push(HarmonicEvent::new(
        0,
        end,
        key,
        Chord::diatonic(ChordDegree::I, key),
    ))
    .unwrap();
    tl
}

fn note(tick: Tick, dur: Tick, pitch: u8, voice: u8, source: NoteSource) -> NoteEvent {
    NoteEvent::new(tick, dur, pitch, voice, source)
}

#[test]
fn leap_resolver_rewrites_offbeat_triplet() {
    // Upward leap C4 -> G4, continuation A4: the continuation pulls
    // back to F4, the first contrary scale step below the landing.
    let tl = c_major_timeline(4);
    let registers = default_registers(1);
    let mut notes = vec![
        note(120, 240, 60, 0, NoteSource::FreeCounterpoint),
        note(360, 240, 67, 0, NoteSource::FreeCounterpoint),
        note(600, 240, 69, 0, NoteSource::FreeCounterpoint),
    ];
    let n = resolve_leaps(&mut notes, &tl, &registers, DEFAULT_LEAP_THRESHOLD);
    assert_eq!(n, 1);
    assert_eq!(notes[2].pitch, 65);
    assert!(notes[2].modified_by.contains(ModifiedBy::LEAP_RESOLUTION));
}

#[test]
fn leap_resolver_is_idempotent() {
    let tl = c_major_timeline(4);
    let registers = default_registers(1);
    let mut notes = vec![
        note(120, 240, 60, 0, NoteSource::FreeCounterpoint),
        note(360, 240, 67, 0, NoteSource::FreeCounterpoint),
        note(600, 240, 69, 0, NoteSource::FreeCounterpoint),
    ];
    resolve_leaps(&mut notes, &tl, &registers, DEFAULT_LEAP_THRESHOLD);
    let again = resolve_leaps(&mut notes, &tl, &registers, DEFAULT_LEAP_THRESHOLD);
    assert_eq!(again, 0);
}

#[test]
fn leap_resolver_threshold_127_disables_resolution() {
    let tl = c_major_timeline(4);
    let registers = default_registers(1);
    let mut notes = vec![
        note(120, 240, 48, 0, NoteSource::FreeCounterpoint),
        note(360, 240, 84, 0, NoteSource::FreeCounterpoint),
        note(600, 240, 86, 0, NoteSource::FreeCounterpoint),
    ];
    assert_eq!(resolve_leaps(&mut notes, &tl, &registers, 127), 0);
    assert_eq!(notes[2].pitch, 86);
}

#[test]
fn leap_resolver_skips_protected_sources() {
    let tl = c_major_timeline(4);
    let registers = default_registers(1);
    let mut notes = vec![
        note(120, 240, 60, 0, NoteSource::FreeCounterpoint),
        note(360, 240, 67, 0, NoteSource::FreeCounterpoint),
        note(600, 240, 69, 0, NoteSource::SubjectCore),
    ];
    assert_eq!(
        resolve_leaps(&mut notes, &tl, &registers, DEFAULT_LEAP_THRESHOLD),
        0
    );
    assert_eq!(notes[2].pitch, 69);
}

#[test]
fn leap_resolver_leaves_contrary_chord_tone_landings() {
    // G4 -> C4 leap, landing already resolved: E4 is a contrary step
    // target... here the continuation D4 steps contrary onto a chord
    // tone-free degree, but B3->C4 style runs are covered elsewhere;
    // this checks the chord-tone landing protection.
    let tl = c_major_timeline(4);
    let registers = default_registers(1);
    let mut notes = vec![
        note(120, 240, 72, 0, NoteSource::FreeCounterpoint),
        note(360, 240, 65, 0, NoteSource::FreeCounterpoint),
        note(600, 240, 67, 0, NoteSource::FreeCounterpoint),
    ];
    // 67 is a chord tone of the prevailing I chord.
    assert_eq!(
        resolve_leaps(&mut notes, &tl, &registers, DEFAULT_LEAP_THRESHOLD),
        0
    );
}

#[test]
fn repeated_note_repair_breaks_a_six_note_run() {
    let tl = c_major_timeline(4);
    let mut notes: Vec<NoteEvent> = (0..6)
        .map(|i| {
            note(
                i * TICKS_PER_BEAT,
                TICKS_PER_BEAT,
                60,
                0,
                NoteSource::FreeCounterpoint,
            )
        })
        .collect();
    let n = repair_repeated_notes(&mut notes, &tl, 3, DEFAULT_RUN_GAP);
    assert_eq!(n, 3);
    let key = Key::new(0, false);
    for kept in &notes[..3] {
        assert_eq!(kept.pitch, 60);
        assert!(!kept.modified_by.contains(ModifiedBy::REPEATED_NOTE));
    }
    for moved in &notes[3..] {
        assert_ne!(moved.pitch, 60);
        assert!(key.contains(moved.pitch));
        assert!((i16::from(moved.pitch) - 60).abs() <= 3);
        assert!(moved.modified_by.contains(ModifiedBy::REPEATED_NOTE));
    }
}

#[test]
fn repeated_note_repair_is_idempotent() {
    let tl = c_major_timeline(4);
    let mut notes: Vec<NoteEvent> = (0..6)
        .map(|i| {
            note(
                i * TICKS_PER_BEAT,
                TICKS_PER_BEAT,
                60,
                0,
                NoteSource::FreeCounterpoint,
            )
        })
        .collect();
    repair_repeated_notes(&mut notes, &tl, 3, DEFAULT_RUN_GAP);
    assert_eq!(repair_repeated_notes(&mut notes, &tl, 3, DEFAULT_RUN_GAP), 0);
}

#[test]
fn repeated_note_repair_unbounded_cap_is_a_no_op() {
    let tl = c_major_timeline(4);
    let mut notes: Vec<NoteEvent> = (0..8)
        .map(|i| {
            note(
                i * TICKS_PER_BEAT,
                TICKS_PER_BEAT,
                60,
                0,
                NoteSource::FreeCounterpoint,
            )
        })
        .collect();
    assert_eq!(
        repair_repeated_notes(&mut notes, &tl, usize::MAX, DEFAULT_RUN_GAP),
        0
    );
    assert!(notes.iter().all(|n| n.pitch == 60));
}

#[test]
fn repeated_note_repair_never_touches_ground_bass() {
    let tl = c_major_timeline(4);
    let mut notes: Vec<NoteEvent> = (0..6)
        .map(|i| note(i * TICKS_PER_BEAT, TICKS_PER_BEAT, 48, 0, NoteSource::GroundBass))
        .collect();
    assert_eq!(repair_repeated_notes(&mut notes, &tl, 3, DEFAULT_RUN_GAP), 0);
    assert!(notes.iter().all(|n| n.pitch == 48));
}

#[test]
fn vertical_check_flags_parallel_fifths() {
    let tl = c_major_timeline(4);
    // Voice 1 walks C4 -> D4 while voice 0 holds G4 then moves to A4:
    // fifth to fifth in similar motion.
    let notes = vec![
        note(0, 480, 67, 0, NoteSource::FreeCounterpoint),
        note(480, 480, 69, 0, NoteSource::FreeCounterpoint),
        note(0, 480, 60, 1, NoteSource::FreeCounterpoint),
        note(480, 480, 62, 1, NoteSource::FreeCounterpoint),
    ];
    // Placing 62 against the sounding 69 after the 60/67 fifth is a
    // parallel fifth.
    assert!(!is_vertically_safe(&notes, 1, 3, 62, &tl));
    // A third instead is fine.
    assert!(is_vertically_safe(&notes, 1, 3, 65, &tl));
}

#[test]
fn vertical_check_rejects_bare_tritone_against_bass() {
    let tl = c_major_timeline(4);
    let notes = vec![
        note(0, 480, 53, 1, NoteSource::FreeCounterpoint),
        note(0, 480, 59, 0, NoteSource::FreeCounterpoint),
    ];
    // F3 under B3 is a tritone and the I chord does not own it.
    assert!(!is_vertically_safe(&notes, 0, 1, 59, &tl));
}

#[test]
fn vertical_sweep_repairs_and_counts() {
    let tl = c_major_timeline(4);
    let mut notes = vec![
        note(0, 480, 67, 0, NoteSource::FreeCounterpoint),
        note(480, 480, 69, 0, NoteSource::FreeCounterpoint),
        note(0, 480, 60, 1, NoteSource::FreeCounterpoint),
        note(480, 480, 62, 1, NoteSource::FreeCounterpoint),
    ];
    let n = enforce_vertical_safety(&mut notes, &tl);
    assert!(n >= 1);
    let repaired = notes
        .iter()
        .filter(|n| n.modified_by.contains(ModifiedBy::PARALLEL_REPAIR))
        .count();
    assert_eq!(repaired, n);
}

#[test]
fn cadential_coverage_fills_a_long_uncadenced_episode() {
    // 36 bars of wandering thirds with no leading tone anywhere.
    let tl = c_major_timeline(36);
    let mut notes: Vec<NoteEvent> = (0u64..(36 * 4))
        .map(|i| {
            let pitch = if i % 2 == 0 { 64 } else { 62 };
            note(
                i * TICKS_PER_BEAT,
                TICKS_PER_BEAT,
                pitch,
                0,
                NoteSource::Episode,
            )
        })
        .collect();
    let mut rng = rng_for(42, "coverage");
    let inserted = insert_cadential_coverage(
        &mut notes,
        &tl,
        None,
        3,
        CoverageOptions::default(),
        &mut rng,
    );
    assert!(inserted >= 1);

    let key = Key::new(0, false);
    let bass: Vec<&NoteEvent> = notes.iter().filter(|n| n.voice == 2).collect();
    assert!(bass.len() >= 2);
    // Each inserted pair: dominant then tonic or the deceptive goal.
    let dominants = bass
        .iter()
        .filter(|n| n.pitch % 12 == key.dominant_pc())
        .count();
    assert!(dominants >= 1);
    assert!(bass.iter().all(|n| n.source == NoteSource::Episode));
}

#[test]
fn cadence_approach_marks_and_protects_shaped_notes() {
    let cadence_tick = 4 * TICKS_PER_BAR;
    let mut notes: Vec<NoteEvent> = (0..4)
        .map(|i| {
            note(
                cadence_tick - (4 - i) * 240,
                240,
                64,
                0,
                NoteSource::FreeCounterpoint,
            )
        })
        .collect();
    notes.push(note(
        cadence_tick - 480,
        480,
        48,
        1,
        NoteSource::FreeCounterpoint,
    ));
    let cadences = [CadencePoint {
        tick: cadence_tick,
        cadence: CadenceType::Perfect,
        key: Key::new(0, false),
    }];
    let modified = shape_cadence_approaches(&mut notes, &cadences);
    assert!(modified >= 1);
    let shaped = notes
        .iter()
        .filter(|n| n.source == NoteSource::CadenceApproach)
        .count();
    assert!(shaped >= modified);
    // Shaped notes are immutable for later passes.
    for n in notes.iter().filter(|n| n.source == NoteSource::CadenceApproach) {
        assert!(!n.protection().allows_pitch_change());
    }
}

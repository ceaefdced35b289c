use pretty_assertions::assert_eq;

use fugata_spec::InstrumentTag;

use crate::types::{ModifiedBy, NoteEvent, NoteSource, Track};

use super::*;

#[test]
fn factory_ranges_match_the_instruments() {
    let cases = [
        (InstrumentTag::Violin, (55, 96)),
        (InstrumentTag::Cello, (36, 88)),
        (InstrumentTag::Guitar, (40, 84)),
        (InstrumentTag::Organ, (36, 96)),
        (InstrumentTag::Harpsichord, (29, 89)),
        (InstrumentTag::Piano, (21, 108)),
    ];
    for (tag, range) in cases {
        let instrument = instrument_for(tag);
        assert_eq!(instrument.range(), range);
        assert!(instrument.is_pitch_playable(range.0));
        assert!(instrument.is_pitch_playable(range.1));
        assert!(!instrument.is_pitch_playable(range.1 + 1));
    }
}

#[test]
fn flexible_out_of_range_pitch_is_octave_shifted() {
    let violin = instrument_for(InstrumentTag::Violin);
    let mut tracks = vec![Track::new(0)];
    tracks[0]
        .notes
        .push(NoteEvent::new(0, 480, 48, 0, NoteSource::FreeCounterpoint));
    let outcome = enforce_impossibility_guard(&mut tracks, violin.as_ref());
    assert_eq!(outcome.modifications, 1);
    let fixed = tracks[0].notes[0];
    assert_eq!(fixed.pitch, 60);
    assert!(fixed.modified_by.contains(ModifiedBy::OCTAVE_ADJUST));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn immutable_out_of_range_pitch_is_left_and_warned() {
    let violin = instrument_for(InstrumentTag::Violin);
    let mut tracks = vec![Track::new(0)];
    tracks[0]
        .notes
        .push(NoteEvent::new(0, 480, 48, 0, NoteSource::SubjectCore));
    let outcome = enforce_impossibility_guard(&mut tracks, violin.as_ref());
    assert_eq!(outcome.modifications, 0);
    assert_eq!(tracks[0].notes[0].pitch, 48);
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn guitar_drops_one_of_two_simultaneous_notes() {
    let guitar = instrument_for(InstrumentTag::Guitar);
    let mut tracks = vec![Track::new(0), Track::new(1)];
    tracks[0]
        .notes
        .push(NoteEvent::new(0, 960, 64, 0, NoteSource::FreeCounterpoint));
    tracks[1]
        .notes
        .push(NoteEvent::new(0, 960, 52, 1, NoteSource::FreeCounterpoint));
    let outcome = enforce_impossibility_guard(&mut tracks, guitar.as_ref());
    assert!(outcome.modifications >= 1);
    let remaining: usize = tracks.iter().map(|t| t.notes.len()).sum();
    assert_eq!(remaining, 1);
}

#[test]
fn violin_wide_double_stop_gets_micro_offset() {
    let violin = instrument_for(InstrumentTag::Violin);
    let mut tracks = vec![Track::new(0), Track::new(1)];
    tracks[0]
        .notes
        .push(NoteEvent::new(0, 960, 88, 0, NoteSource::FreeCounterpoint));
    tracks[1]
        .notes
        .push(NoteEvent::new(0, 960, 60, 1, NoteSource::FreeCounterpoint));
    let outcome = enforce_impossibility_guard(&mut tracks, violin.as_ref());
    assert!(outcome.modifications >= 1);
    // Nothing deleted; one note was staggered instead.
    let staggered: usize = tracks
        .iter()
        .flat_map(|t| t.notes.iter())
        .filter(|n| n.modified_by.contains(ModifiedBy::ARTICULATION))
        .count();
    assert_eq!(staggered, 1);
    let remaining: usize = tracks.iter().map(|t| t.notes.len()).sum();
    assert_eq!(remaining, 2);
}

#[test]
fn keyboards_accept_dense_chords() {
    let organ = instrument_for(InstrumentTag::Organ);
    let mut tracks: Vec<Track> = (0..5)
        .map(|v| {
            let mut t = Track::new(v);
            t.notes.push(NoteEvent::new(
                0,
                960,
                48 + v * 4,
                v,
                NoteSource::FreeCounterpoint,
            ));
            t
        })
        .collect();
    let outcome = enforce_impossibility_guard(&mut tracks, organ.as_ref());
    assert_eq!(outcome.modifications, 0);
    assert!(tracks.iter().all(|t| t.notes.len() == 1));
}

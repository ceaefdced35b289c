//! SMF (format 1) writer.
//!
//! Track 0 carries the tempo map as set-tempo meta events; each voice
//! track follows in channel order. The division matches the engine's
//! tick grid, so note ticks map through unchanged.

use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};
use thiserror::Error;

use fugata_engine::forms::Score;
use fugata_engine::{Tick, Track, TICKS_PER_BEAT};

/// Ticks per quarter note in the file header, equal to the engine grid.
pub const DIVISION: u16 = TICKS_PER_BEAT as u16;

/// Fallback tempo when a score has no tempo events.
const DEFAULT_BPM: u32 = 120;

#[derive(Debug, Error)]
pub enum SmfError {
    #[error("midi write failed: {0}")]
    Io(#[from] io::Error),
}

/// Write a variable-length quantity (big-endian 7-bit groups).
fn write_vlq<W: Write>(w: &mut W, mut value: u32) -> io::Result<()> {
    let mut stack = [0u8; 5];
    let mut n = 0;
    loop {
        stack[n] = (value & 0x7f) as u8;
        value >>= 7;
        n += 1;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let mut byte = stack[i];
        if i > 0 {
            byte |= 0x80;
        }
        w.write_u8(byte)?;
    }
    Ok(())
}

/// One raw track event before delta encoding.
///
/// `order` breaks ties at a shared tick: note-offs sort before
/// note-ons so repeated pitches never hang.
struct RawEvent {
    tick: Tick,
    order: u8,
    bytes: Vec<u8>,
}

/// Delta-encode raw events into a complete MTrk chunk.
fn track_chunk(mut events: Vec<RawEvent>) -> io::Result<Vec<u8>> {
    events.sort_by(|a, b| (a.tick, a.order).cmp(&(b.tick, b.order)));

    let mut body: Vec<u8> = Vec::new();
    let mut cursor: Tick = 0;
    for event in &events {
        write_vlq(&mut body, (event.tick - cursor) as u32)?;
        body.write_all(&event.bytes)?;
        cursor = event.tick;
    }
    // End of track.
    write_vlq(&mut body, 0)?;
    body.write_all(&[0xff, 0x2f, 0x00])?;

    let mut chunk: Vec<u8> = Vec::with_capacity(body.len() + 8);
    chunk.write_all(b"MTrk")?;
    chunk.write_u32::<BigEndian>(body.len() as u32)?;
    chunk.write_all(&body)?;
    Ok(chunk)
}

/// The tempo meta track.
fn tempo_events(score: &Score) -> Vec<RawEvent> {
    let mut events: Vec<RawEvent> = Vec::new();
    if score.tempo.is_empty() {
        events.push(set_tempo(0, DEFAULT_BPM));
        return events;
    }
    for e in score.tempo.events() {
        events.push(set_tempo(e.tick, u32::from(e.bpm)));
    }
    events
}

fn set_tempo(tick: Tick, bpm: u32) -> RawEvent {
    let micros = 60_000_000 / bpm.max(1);
    let bytes = vec![
        0xff,
        0x51,
        0x03,
        ((micros >> 16) & 0xff) as u8,
        ((micros >> 8) & 0xff) as u8,
        (micros & 0xff) as u8,
    ];
    RawEvent {
        tick,
        order: 0,
        bytes,
    }
}

/// Note on/off pairs for one voice track.
fn note_events(track: &Track) -> Vec<RawEvent> {
    let channel = track.channel % 16;
    let mut events: Vec<RawEvent> = Vec::with_capacity(track.notes.len() * 2);
    for n in &track.notes {
        events.push(RawEvent {
            tick: n.start_tick,
            order: 1,
            bytes: vec![0x90 | channel, n.pitch & 0x7f, n.velocity.clamp(1, 127)],
        });
        events.push(RawEvent {
            tick: n.start_tick + n.duration,
            order: 0,
            bytes: vec![0x80 | channel, n.pitch & 0x7f, 0],
        });
    }
    events
}

/// Write a score as a complete format-1 SMF.
pub fn write_score<W: Write>(score: &Score, w: &mut W) -> Result<(), SmfError> {
    w.write_all(b"MThd")?;
    w.write_u32::<BigEndian>(6)?;
    w.write_u16::<BigEndian>(1)?;
    w.write_u16::<BigEndian>(1 + score.tracks.len() as u16)?;
    w.write_u16::<BigEndian>(DIVISION)?;

    w.write_all(&track_chunk(tempo_events(score))?)?;
    for track in &score.tracks {
        w.write_all(&track_chunk(note_events(track))?)?;
    }
    Ok(())
}

/// Serialize a score to SMF bytes.
pub fn score_to_bytes(score: &Score) -> Result<Vec<u8>, SmfError> {
    let mut buffer = Vec::new();
    write_score(score, &mut buffer)?;
    Ok(buffer)
}

/// BLAKE3 hash of the SMF bytes, for determinism checks.
pub fn score_hash(score: &Score) -> Result<String, SmfError> {
    let bytes = score_to_bytes(score)?;
    Ok(bytes_hash(&bytes))
}

/// BLAKE3 hash of already-serialized bytes.
pub fn bytes_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use fugata_engine::generate;
    use fugata_spec::{FormConfig, FugueConfig, ScoreSpec};

    use super::*;

    fn vlq(value: u32) -> Vec<u8> {
        let mut out = Vec::new();
        write_vlq(&mut out, value).unwrap();
        out
    }

    #[test]
    fn vlq_encoding_matches_the_smf_reference_values() {
        assert_eq!(vlq(0), vec![0x00]);
        assert_eq!(vlq(0x7f), vec![0x7f]);
        assert_eq!(vlq(0x80), vec![0x81, 0x00]);
        assert_eq!(vlq(0x2000), vec![0xc0, 0x00]);
        assert_eq!(vlq(0x0fff_ffff), vec![0xff, 0xff, 0xff, 0x7f]);
    }

    #[test]
    fn set_tempo_payload_is_microseconds_per_quarter() {
        let event = set_tempo(0, 120);
        // 500_000 us = 0x07 0xa1 0x20
        assert_eq!(event.bytes, vec![0xff, 0x51, 0x03, 0x07, 0xa1, 0x20]);
    }

    #[test]
    fn note_off_sorts_before_note_on_at_a_shared_tick() {
        let mut track = Track::new(0);
        let mut a = fugata_engine::NoteEvent::new(0, 480, 60, 0, fugata_engine::NoteSource::Texture);
        a.velocity = 80;
        let mut b = fugata_engine::NoteEvent::new(480, 480, 60, 0, fugata_engine::NoteSource::Texture);
        b.velocity = 80;
        track.notes = vec![a, b];
        let chunk = track_chunk(note_events(&track)).unwrap();
        // After the first on/off pair the off (0x80) must precede the
        // second on (0x90) for the repeated pitch.
        let body = &chunk[8..];
        let ons: Vec<usize> = body
            .windows(3)
            .enumerate()
            .filter(|(_, w)| *w == [0x90, 60, 80])
            .map(|(i, _)| i)
            .collect();
        let off = body.windows(3).position(|w| w == [0x80, 60, 0]).unwrap();
        assert_eq!(ons.len(), 2);
        assert!(ons[0] < off && off < ons[1]);
    }

    #[test]
    fn header_declares_format_one_and_the_engine_division() {
        let request = ScoreSpec {
            name: "smf".to_string(),
            seed: 3,
            config: FormConfig::Fugue(FugueConfig::default()),
        };
        let score = generate(&request).unwrap();
        let bytes = score_to_bytes(&score).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[8..10], &[0x00, 0x01]);
        let tracks = u16::from_be_bytes([bytes[10], bytes[11]]);
        assert_eq!(tracks as usize, 1 + score.tracks.len());
        let division = u16::from_be_bytes([bytes[12], bytes[13]]);
        assert_eq!(division, 480);
    }

    #[test]
    fn identical_scores_hash_identically() {
        let request = ScoreSpec {
            name: "hash".to_string(),
            seed: 99,
            config: FormConfig::Fugue(FugueConfig::default()),
        };
        let a = score_hash(&generate(&request).unwrap()).unwrap();
        let b = score_hash(&generate(&request).unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}

//! Exposition scheduling and assembly.
//!
//! Entries alternate subject and answer, one per voice, spaced by the
//! subject length. The entry order is weighted by character. Each
//! statement is octave-placed into its voice register; accompanying
//! lines get a strong-beat consonance check against the current
//! statement at assembly time.

use rand::Rng;
use rand_pcg::Pcg32;

use fugata_spec::Character;

use crate::types::{
    is_strong_beat, NoteEvent, NoteSource, Provenance, Tick, TransformStep, VoiceRange,
};

use super::answer::{derive_answer, restate_answer, Answer};
use super::countersubject::{derive_countersubject, restate_countersubject, Countersubject};
use super::generate::{restate_subject, Subject};

/// One scheduled entry of the subject or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub voice: u8,
    pub tick: Tick,
    pub is_answer: bool,
}

/// The assembled exposition.
#[derive(Debug, Clone)]
pub struct Exposition {
    pub entries: Vec<Entry>,
    pub answer: Answer,
    pub countersubject: Countersubject,
    pub notes: Vec<NoteEvent>,
    pub end_tick: Tick,
}

/// Entry orders keyed by character: nobles lead from the top, playful
/// characters from the middle, severe ones from the bass.
fn entry_order(num_voices: u8, character: Character, rng: &mut Pcg32) -> Vec<u8> {
    let v = num_voices;
    let top_down: Vec<u8> = (0..v).collect();
    let bottom_up: Vec<u8> = (0..v).rev().collect();
    let middle_out: Vec<u8> = {
        let mut order = Vec::with_capacity(v as usize);
        let mid = v / 2;
        order.push(mid);
        for d in 1..=v {
            if mid >= d && !order.contains(&(mid - d)) {
                order.push(mid - d);
            }
            if mid + d < v && !order.contains(&(mid + d)) {
                order.push(mid + d);
            }
        }
        order
    };

    let (preferred, weight) = match character {
        Character::Noble => (top_down.clone(), 70),
        Character::Playful => (middle_out.clone(), 70),
        Character::Severe => (bottom_up.clone(), 70),
    };
    if rng.gen_range(0..100) < weight {
        preferred
    } else {
        let alternatives = [top_down, middle_out, bottom_up];
        let pick = rng.gen_range(0..alternatives.len());
        alternatives[pick].clone()
    }
}

/// Schedule one entry per voice, spaced by the subject length.
pub fn schedule_entries(
    num_voices: u8,
    subject_len: Tick,
    character: Character,
    rng: &mut Pcg32,
) -> Vec<Entry> {
    entry_order(num_voices, character, rng)
        .into_iter()
        .enumerate()
        .map(|(i, voice)| Entry {
            voice,
            tick: i as Tick * subject_len,
            is_answer: i % 2 == 1,
        })
        .collect()
}

/// Shift `notes` by whole octaves so their mean pitch sits inside
/// `range`, recording the shift when it happens.
fn place_in_register(notes: &mut [NoteEvent], range: &VoiceRange) {
    if notes.is_empty() {
        return;
    }
    let mean =
        notes.iter().map(|n| u32::from(n.pitch)).sum::<u32>() / notes.len() as u32;
    let center = u32::from(range.center());
    let mut shift: i16 = 0;
    let mut m = mean as i16;
    while m < center as i16 - 6 {
        shift += 12;
        m += 12;
    }
    while m > center as i16 + 6 {
        shift -= 12;
        m -= 12;
    }
    if shift != 0 {
        for n in notes.iter_mut() {
            n.pitch = (i16::from(n.pitch) + shift).clamp(0, 127) as u8;
            n.record(TransformStep::OctaveAdjust);
        }
    }
}

/// Intervals treated as consonant against the statement on strong beats.
fn is_consonance(interval: u8) -> bool {
    matches!(interval % 12, 0 | 3 | 4 | 5 | 7 | 8 | 9)
}

/// Snap accompanying notes that clash with the concurrent statement on
/// strong beats to the nearest consonant scale tone.
pub(super) fn snap_strong_beats(
    line: &mut [NoteEvent],
    statement: &[NoteEvent],
    key: &crate::types::Key,
) {
    for note in line.iter_mut() {
        if !is_strong_beat(note.start_tick) {
            continue;
        }
        let Some(against) = statement.iter().find(|s| s.sounds_at(note.start_tick)) else {
            continue;
        };
        let interval = (i16::from(note.pitch) - i16::from(against.pitch)).unsigned_abs() as u8;
        if is_consonance(interval) {
            continue;
        }
        // Try scale tones stepping outward from the written pitch.
        for delta in [-1i16, 1, -2, 2, -3, 3] {
            let candidate = i16::from(note.pitch) + delta;
            if !(0..=127).contains(&candidate) {
                continue;
            }
            let candidate = candidate as u8;
            let iv = (i16::from(candidate) - i16::from(against.pitch)).unsigned_abs() as u8;
            if key.contains(candidate) && is_consonance(iv) {
                note.pitch = candidate;
                note.record(TransformStep::CollisionAvoidance);
                break;
            }
        }
    }
}

/// Simple sustained free counterpoint on tonic-triad tones for voices
/// that have finished both subject and countersubject duty.
fn free_line(
    key: &crate::types::Key,
    range: &VoiceRange,
    start: Tick,
    len: Tick,
    voice: u8,
    rng: &mut Pcg32,
) -> Vec<NoteEvent> {
    let triad = [key.tonic, (key.tonic + if key.minor { 3 } else { 4 }) % 12, key.dominant_pc()];
    let mut notes = Vec::new();
    let mut tick = start;
    let half: Tick = 960;
    while tick < start + len {
        let dur = half.min(start + len - tick);
        let pc = triad[rng.gen_range(0..triad.len())];
        // Nearest instance of the pitch class to the register center.
        let center = range.center();
        let mut pitch = (center / 12) * 12 + pc;
        if pitch > center && pitch - center > 6 {
            pitch -= 12;
        } else if center > pitch && center - pitch > 6 {
            pitch += 12;
        }
        let pitch = range.clamp(pitch);
        let ev = NoteEvent::new(tick, dur, pitch, voice, NoteSource::FreeCounterpoint)
            .with_provenance(Provenance::new(pitch, tick));
        notes.push(ev);
        tick += dur;
    }
    notes
}

/// Assemble the full exposition for `subject` across `num_voices`.
pub fn build_exposition(
    subject: &Subject,
    num_voices: u8,
    registers: &[VoiceRange],
    character: Character,
    rng: &mut Pcg32,
) -> Exposition {
    let answer = derive_answer(subject);
    let countersubject = derive_countersubject(&answer, rng);
    let entries = schedule_entries(num_voices, subject.length_ticks, character, rng);
    let end_tick = entries.len() as Tick * subject.length_ticks;

    let mut notes: Vec<NoteEvent> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let range = &registers[entry.voice as usize];

        // The statement itself.
        let mut statement = if entry.is_answer {
            restate_answer(&answer, entry.tick, entry.voice, i as u8 + 1)
        } else {
            restate_subject(subject, subject.key, entry.tick, entry.voice, i as u8 + 1)
        };
        place_in_register(&mut statement, range);

        // The previous entrant carries the countersubject against this
        // statement; entries before that move in free counterpoint.
        if i >= 1 {
            let prev = entries[i - 1];
            let prev_range = &registers[prev.voice as usize];
            // The countersubject was derived against the answer; when
            // it accompanies a subject entry it moves down a fifth.
            let shift: i16 = if entry.is_answer { 0 } else { -7 };
            let mut cs = restate_countersubject(&countersubject, entry.tick, prev.voice, shift);
            place_in_register(&mut cs, prev_range);
            snap_strong_beats(&mut cs, &statement, &subject.key);
            notes.extend(cs);
        }
        for older in entries.iter().take(i.saturating_sub(1)) {
            let older_range = &registers[older.voice as usize];
            let mut line = free_line(
                &subject.key,
                older_range,
                entry.tick,
                subject.length_ticks,
                older.voice,
                rng,
            );
            snap_strong_beats(&mut line, &statement, &subject.key);
            notes.extend(line);
        }

        notes.extend(statement);
    }

    Exposition {
        entries,
        answer,
        countersubject,
        notes,
        end_tick,
    }
}

//! Repeated-note repair.
//!
//! Breaks up long runs of a single pitch within one voice. Runs are
//! same-pitch notes whose gaps stay under a threshold; once a run
//! exceeds `max_consecutive`, every excess note moves to a nearby
//! scale tone, alternating direction against and with the approach
//! motion.

use crate::harmony::HarmonicTimeline;
use crate::types::{ModifiedBy, NoteEvent, Tick, TICKS_PER_BAR};

use super::{max_voice, sort_for_passes, voice_indices};

/// Default run cap.
pub const DEFAULT_MAX_CONSECUTIVE: usize = 3;

/// Default gap under which same-pitch notes still count as one run.
pub const DEFAULT_RUN_GAP: Tick = 2 * TICKS_PER_BAR;

/// Repair over-long repeated-note runs. Returns the number of notes
/// modified.
pub fn repair_repeated_notes(
    notes: &mut [NoteEvent],
    timeline: &HarmonicTimeline,
    max_consecutive: usize,
    run_gap: Tick,
) -> usize {
    if max_consecutive == usize::MAX {
        return 0;
    }
    sort_for_passes(notes);
    let mut modified = 0usize;
    let Some(top) = max_voice(notes) else {
        return 0;
    };

    for voice in 0..=top {
        let idx = voice_indices(notes, voice);
        let mut run_start = 0usize;
        let mut w = 1;
        while w <= idx.len() {
            let extends = w < idx.len() && {
                let prev = &notes[idx[w - 1]];
                let cur = &notes[idx[w]];
                cur.pitch == prev.pitch && cur.start_tick.saturating_sub(prev.end_tick()) <= run_gap
            };
            if !extends {
                let run = &idx[run_start..w];
                if run.len() > max_consecutive {
                    modified += repair_run(notes, timeline, &idx, run_start, w, max_consecutive);
                }
                run_start = w;
            }
            w += 1;
        }
    }
    modified
}

fn repair_run(
    notes: &mut [NoteEvent],
    timeline: &HarmonicTimeline,
    idx: &[usize],
    run_start: usize,
    run_end: usize,
    max_consecutive: usize,
) -> usize {
    let run_pitch = notes[idx[run_start]].pitch;
    // Motion into the run decides the alternation phase; an
    // unapproached run behaves as if approached from below.
    let approach: i16 = if run_start > 0 {
        let before = notes[idx[run_start - 1]].pitch;
        if i16::from(run_pitch) >= i16::from(before) {
            1
        } else {
            -1
        }
    } else {
        1
    };

    let mut modified = 0usize;
    for (k, &i) in idx[run_start + max_consecutive..run_end].iter().enumerate() {
        if !notes[i].protection().allows_pitch_change() {
            continue;
        }
        let preferred: i16 = if k % 2 == 0 { -approach } else { approach };
        let key = timeline.key_at(notes[i].start_tick);
        let candidate = [preferred, -preferred].into_iter().find_map(|dir| {
            (1i16..=3)
                .map(|off| i16::from(run_pitch) + dir * off)
                .filter(|p| (0..=127).contains(p))
                .map(|p| p as u8)
                .find(|&p| key.contains(p))
        });
        if let Some(p) = candidate {
            if p != notes[i].pitch {
                notes[i].pitch = p;
                notes[i].modified_by.insert(ModifiedBy::REPEATED_NOTE);
                modified += 1;
            }
        }
    }
    modified
}

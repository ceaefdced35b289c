//! Cadential coverage.
//!
//! Long stretches with no leading-tone resolution read as aimless, so
//! this pass inserts a minimal dominant-to-tonic bass formula at the
//! bar line closing any over-long gap, as long as the spot is not
//! inside a subject-entry section.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::harmony::HarmonicTimeline;
use crate::structure::FugueStructure;
use crate::types::{Key, NoteEvent, NoteSource, Tick, TICKS_PER_BAR, TICKS_PER_BEAT};

/// Tuning for the coverage scan.
#[derive(Debug, Clone, Copy)]
pub struct CoverageOptions {
    /// Largest tolerated gap without a cadential resolution, in bars.
    pub max_bars: u32,
    /// Chance of inserting a deceptive resolution instead of a
    /// perfect one.
    pub deceptive_probability: f64,
}

impl Default for CoverageOptions {
    fn default() -> CoverageOptions {
        CoverageOptions {
            max_bars: 16,
            deceptive_probability: 0.2,
        }
    }
}

/// Ticks at which some voice resolves the leading tone up to the
/// tonic within a two-beat window.
fn resolution_ticks(notes: &[NoteEvent], timeline: &HarmonicTimeline) -> Vec<Tick> {
    let mut ticks = Vec::new();
    for n in notes {
        let key = timeline.key_at(n.start_tick);
        if n.pitch % 12 != key.leading_tone_pc() {
            continue;
        }
        let window = 2 * TICKS_PER_BEAT;
        let resolved = notes.iter().any(|m| {
            m.voice == n.voice
                && m.start_tick >= n.end_tick()
                && m.start_tick <= n.end_tick() + window
                && m.pitch % 12 == key.tonic
        });
        if resolved {
            ticks.push(n.start_tick);
        }
    }
    ticks.sort_unstable();
    ticks
}

fn bass_pitch_for(pc: u8) -> u8 {
    // Place in the small octave around C3.
    48 + pc % 12
}

fn formula(key: Key, boundary: Tick, voice: u8, deceptive: bool) -> [NoteEvent; 2] {
    let dominant = bass_pitch_for(key.dominant_pc());
    let goal_pc = if deceptive {
        if key.minor {
            // Deceptive motion in minor lands on flat VI.
            (key.tonic + 8) % 12
        } else {
            (key.tonic + 9) % 12
        }
    } else {
        key.tonic
    };
    let goal = bass_pitch_for(goal_pc);
    [
        NoteEvent::new(
            boundary - TICKS_PER_BEAT,
            TICKS_PER_BEAT,
            dominant,
            voice,
            NoteSource::Episode,
        ),
        NoteEvent::new(boundary, 2 * TICKS_PER_BEAT, goal, voice, NoteSource::Episode),
    ]
}

/// Scan for over-long uncadenced stretches and insert bass formulas.
/// Returns the number of cadences inserted.
pub fn insert_cadential_coverage(
    notes: &mut Vec<NoteEvent>,
    timeline: &HarmonicTimeline,
    structure: Option<&FugueStructure>,
    num_voices: u8,
    opts: CoverageOptions,
    rng: &mut Pcg32,
) -> usize {
    if notes.is_empty() || num_voices == 0 {
        return 0;
    }
    let bass_voice = num_voices - 1;
    let span_end = notes.iter().map(|n| n.end_tick()).max().unwrap_or(0);
    let max_gap = Tick::from(opts.max_bars) * TICKS_PER_BAR;

    let resolutions = resolution_ticks(notes, timeline);
    let mut inserted = 0usize;
    let mut covered: Tick = 0;
    let mut cursor: Tick = 0;

    while cursor < span_end {
        if let Some(&next) = resolutions.iter().find(|&&t| t >= covered) {
            if next <= covered + max_gap {
                covered = next + 1;
                cursor = covered;
                continue;
            }
        }
        let boundary = covered + max_gap;
        let boundary = boundary - boundary % TICKS_PER_BAR;
        if boundary >= span_end || boundary < TICKS_PER_BEAT {
            break;
        }
        let in_entry = structure
            .map(|s| s.in_subject_entry_section(boundary))
            .unwrap_or(false);
        if !in_entry {
            let key = timeline.key_at(boundary);
            let deceptive = rng.gen_bool(opts.deceptive_probability);
            notes.extend(formula(key, boundary, bass_voice, deceptive));
            inserted += 1;
        }
        covered = boundary + 1;
        cursor = covered;
    }

    if inserted > 0 {
        super::sort_for_passes(notes);
    }
    inserted
}

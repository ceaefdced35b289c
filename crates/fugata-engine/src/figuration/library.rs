//! The static template library.
//!
//! Every template spans one beat (480 ticks). Sixteenth figuration
//! uses four 120-tick steps; the slot patterns hold longer values.

use rand::Rng;
use rand_pcg::Pcg32;

use super::template::{FigurationTemplate, NctFunction, TemplateStep};

const SIXTEENTH: u64 = 120;
const EIGHTH: u64 = 240;
const BEAT: u64 = 480;

fn step(
    voice_index: u8,
    scale_offset: i8,
    relative_tick: u64,
    duration: u64,
    nct: NctFunction,
) -> TemplateStep {
    TemplateStep {
        voice_index,
        scale_offset,
        relative_tick,
        duration,
        nct,
    }
}

/// Broken chord: bass, then upper voices low to high.
fn broken_chord() -> FigurationTemplate {
    FigurationTemplate {
        name: "broken_chord",
        steps: vec![
            TemplateStep::chord_tone(2, 0, SIXTEENTH),
            TemplateStep::chord_tone(1, SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(0, 2 * SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(1, 3 * SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Alberti figure: low, high, middle, high.
fn alberti() -> FigurationTemplate {
    FigurationTemplate {
        name: "alberti",
        steps: vec![
            TemplateStep::chord_tone(2, 0, SIXTEENTH),
            TemplateStep::chord_tone(0, SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(1, 2 * SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(0, 3 * SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Chord tone, passing step up, chord tone above.
fn scale_connect() -> FigurationTemplate {
    FigurationTemplate {
        name: "scale_connect",
        steps: vec![
            TemplateStep::chord_tone(1, 0, SIXTEENTH),
            step(1, 1, SIXTEENTH, SIXTEENTH, NctFunction::Passing),
            TemplateStep::chord_tone(0, 2 * SIXTEENTH, SIXTEENTH),
            step(0, 1, 3 * SIXTEENTH, SIXTEENTH, NctFunction::Neighbor),
        ],
    }
}

/// Rising arpeggio through all voices.
fn rising() -> FigurationTemplate {
    FigurationTemplate {
        name: "rising",
        steps: vec![
            TemplateStep::chord_tone(3, 0, SIXTEENTH),
            TemplateStep::chord_tone(2, SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(1, 2 * SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(0, 3 * SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Falling arpeggio.
fn falling() -> FigurationTemplate {
    FigurationTemplate {
        name: "falling",
        steps: vec![
            TemplateStep::chord_tone(0, 0, SIXTEENTH),
            TemplateStep::chord_tone(1, SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(2, 2 * SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(3, 3 * SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Up then down.
fn arch() -> FigurationTemplate {
    FigurationTemplate {
        name: "arch",
        steps: vec![
            TemplateStep::chord_tone(2, 0, SIXTEENTH),
            TemplateStep::chord_tone(1, SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(0, 2 * SIXTEENTH, SIXTEENTH),
            TemplateStep::chord_tone(1, 3 * SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Eighth-note pair with a neighbor decoration.
fn mixed() -> FigurationTemplate {
    FigurationTemplate {
        name: "mixed",
        steps: vec![
            TemplateStep::chord_tone(1, 0, EIGHTH),
            step(0, -1, EIGHTH, SIXTEENTH, NctFunction::Neighbor),
            TemplateStep::chord_tone(0, EIGHTH + SIXTEENTH, SIXTEENTH),
        ],
    }
}

/// Sustained chord slot: every voice holds the beat.
fn slot_block() -> FigurationTemplate {
    FigurationTemplate {
        name: "slot_block",
        steps: vec![
            TemplateStep::chord_tone(0, 0, BEAT),
            TemplateStep::chord_tone(1, 0, BEAT),
            TemplateStep::chord_tone(2, 0, BEAT),
        ],
    }
}

/// Bass holds, upper voices move in eighths.
fn slot_walk() -> FigurationTemplate {
    FigurationTemplate {
        name: "slot_walk",
        steps: vec![
            TemplateStep::chord_tone(2, 0, BEAT),
            TemplateStep::chord_tone(1, 0, EIGHTH),
            step(1, 1, EIGHTH, EIGHTH, NctFunction::Passing),
            TemplateStep::chord_tone(0, 0, EIGHTH),
            TemplateStep::chord_tone(0, EIGHTH, EIGHTH),
        ],
    }
}

/// The full library in a fixed order.
pub fn template_library() -> Vec<FigurationTemplate> {
    vec![
        broken_chord(),
        alberti(),
        scale_connect(),
        rising(),
        falling(),
        arch(),
        mixed(),
        slot_block(),
        slot_walk(),
    ]
}

/// Pick a template for one beat, restricted to templates whose voice
/// span fits the available voicing.
pub fn select_template(rng: &mut Pcg32, num_voices: u8) -> FigurationTemplate {
    let library = template_library();
    let fitting: Vec<FigurationTemplate> = library
        .into_iter()
        .filter(|t| t.voice_span() <= num_voices)
        .collect();
    if fitting.is_empty() {
        return broken_chord();
    }
    let idx = rng.gen_range(0..fitting.len());
    fitting[idx].clone()
}

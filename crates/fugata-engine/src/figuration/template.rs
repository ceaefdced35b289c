//! Figuration template types.

use crate::types::Tick;

/// Non-chord-tone function of a template step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NctFunction {
    ChordTone,
    Passing,
    Neighbor,
}

/// One step of a template.
///
/// `voice_index` selects a pitch from the chord voicing; `scale_offset`
/// of -1/0/+1 moves to the nearest diatonic scale tone below/at/above
/// that pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateStep {
    pub voice_index: u8,
    pub scale_offset: i8,
    pub relative_tick: Tick,
    pub duration: Tick,
    pub nct: NctFunction,
}

impl TemplateStep {
    pub const fn chord_tone(voice_index: u8, relative_tick: Tick, duration: Tick) -> TemplateStep {
        TemplateStep {
            voice_index,
            scale_offset: 0,
            relative_tick,
            duration,
            nct: NctFunction::ChordTone,
        }
    }
}

/// A named one-beat pattern of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurationTemplate {
    pub name: &'static str,
    pub steps: Vec<TemplateStep>,
}

impl FigurationTemplate {
    /// Number of distinct emitting voices.
    pub fn voice_span(&self) -> u8 {
        self.steps
            .iter()
            .map(|s| s.voice_index)
            .max()
            .map(|v| v + 1)
            .unwrap_or(0)
    }
}

//! Harmonic events and cadence types.

use serde::Serialize;

use crate::types::{Key, Tick};

use super::chord::Chord;

/// Named cadence types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceType {
    /// V -> I
    Perfect,
    /// * -> V
    Half,
    /// V -> vi (V -> bVI in minor)
    Deceptive,
    /// iv6 -> V
    Phrygian,
    /// IV -> I
    Plagal,
    /// Minor-key close on a major tonic.
    PicardyThird,
}

impl CadenceType {
    pub fn name(&self) -> &'static str {
        match self {
            CadenceType::Perfect => "perfect",
            CadenceType::Half => "half",
            CadenceType::Deceptive => "deceptive",
            CadenceType::Phrygian => "phrygian",
            CadenceType::Plagal => "plagal",
            CadenceType::PicardyThird => "picardy_third",
        }
    }
}

/// One planned cadence at a structural boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CadencePoint {
    pub tick: Tick,
    pub cadence: CadenceType,
    pub key: Key,
}

/// A chord over a half-open `[tick, end_tick)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HarmonicEvent {
    pub tick: Tick,
    pub end_tick: Tick,
    pub key: Key,
    pub chord: Chord,
    /// Concrete bass placement for the voicer.
    pub bass_pitch: u8,
    /// Metric salience 0.0-1.0.
    pub weight: f64,
    /// Set for cadence-realized events; the voicer must not substitute.
    pub is_immutable: bool,
}

impl HarmonicEvent {
    pub fn new(tick: Tick, end_tick: Tick, key: Key, chord: Chord) -> HarmonicEvent {
        // Default bass placement: the inversion's bass class near C3.
        let bass_pc = chord.bass_pc(key);
        HarmonicEvent {
            tick,
            end_tick,
            key,
            chord,
            bass_pitch: 48 + bass_pc,
            weight: if tick % crate::types::TICKS_PER_BAR == 0 {
                1.0
            } else if crate::types::is_strong_beat(tick) {
                0.75
            } else {
                0.5
            },
            is_immutable: false,
        }
    }

    pub fn covers(&self, tick: Tick) -> bool {
        self.tick <= tick && tick < self.end_tick
    }

    pub fn is_minor(&self) -> bool {
        self.key.minor
    }
}

//! Tempo map construction.
//!
//! Each form has a base tempo scaled by character; section types
//! nudge it by a fixed percentage, and every planned cadence gets a
//! three-step ritardando with an a-tempo one beat after. BPM is
//! clamped to [40, 200] and events are deduplicated by tick, last
//! writer wins.

use serde::Serialize;

use fugata_spec::Character;

use crate::structure::SectionKind;
use crate::types::{Tick, TICKS_PER_BEAT};

pub const MIN_BPM: u16 = 40;
pub const MAX_BPM: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TempoEvent {
    pub tick: Tick,
    pub bpm: u16,
}

/// A sorted, tick-unique list of tempo events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempoMap {
    events: Vec<TempoEvent>,
}

impl TempoMap {
    pub fn new() -> TempoMap {
        TempoMap::default()
    }

    /// Append an event; clamping happens here so no caller can push
    /// an out-of-band BPM.
    pub fn push(&mut self, tick: Tick, bpm: f64) {
        let bpm = bpm.round().clamp(f64::from(MIN_BPM), f64::from(MAX_BPM)) as u16;
        self.events.push(TempoEvent { tick, bpm });
    }

    /// Sort by tick and collapse duplicate ticks, keeping the most
    /// recently pushed event for each.
    pub fn finalize(&mut self) {
        self.events.sort_by_key(|e| e.tick);
        let mut deduped: Vec<TempoEvent> = Vec::with_capacity(self.events.len());
        for e in self.events.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.tick == e.tick => *last = e,
                _ => deduped.push(e),
            }
        }
        self.events = deduped;
    }

    pub fn events(&self) -> &[TempoEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Base tempo per form, before character scaling.
pub fn base_bpm(form: &str) -> f64 {
    match form {
        "fugue" => 88.0,
        "chaconne" => 66.0,
        "prelude" => 96.0,
        "toccata" => 112.0,
        "fantasia" => 76.0,
        "passacaglia" => 63.0,
        "goldberg" => 72.0,
        _ => 80.0,
    }
}

/// Character multiplier on the base tempo.
pub fn character_scale(character: Character) -> f64 {
    match character {
        Character::Noble => 1.0,
        Character::Playful => 1.1,
        Character::Severe => 0.92,
    }
}

/// Fixed tempo offset for a fugue section type, as a fraction.
pub fn section_offset(kind: SectionKind) -> f64 {
    match kind {
        SectionKind::Exposition => 0.0,
        SectionKind::Episode => 0.04,
        SectionKind::MiddleEntry => 0.0,
        SectionKind::Stretto => 0.08,
        SectionKind::Coda => -0.10,
    }
}

/// Insert the three-step ritardando into a cadence plus the a-tempo
/// recovery one beat after.
pub fn cadence_ritardando(map: &mut TempoMap, cadence_tick: Tick, bpm: f64) {
    let steps = [
        (2 * TICKS_PER_BEAT, 0.92),
        (TICKS_PER_BEAT, 0.85),
        (0, 0.75),
    ];
    for (before, factor) in steps {
        if cadence_tick >= before {
            map.push(cadence_tick - before, bpm * factor);
        }
    }
    map.push(cadence_tick + TICKS_PER_BEAT, bpm);
}

/// Build a complete tempo map from section starts and cadence ticks.
pub fn build_tempo_map(
    base: f64,
    sections: &[(Tick, f64)],
    cadences: &[Tick],
) -> TempoMap {
    let mut map = TempoMap::new();
    if sections.is_empty() {
        map.push(0, base);
    }
    for &(tick, offset) in sections {
        map.push(tick, base * (1.0 + offset));
    }
    for &tick in cadences {
        map.push(tick, base);
    }
    for &tick in cadences {
        cadence_ritardando(&mut map, tick, base);
    }
    map.finalize();
    map
}

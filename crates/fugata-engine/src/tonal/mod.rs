//! Tonal planning: the modulation schedule and its expansion into a
//! beat-resolution harmonic timeline.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::harmony::{Chord, ChordDegree, HarmonicEvent, HarmonicTimeline};
use crate::types::{bar_of, tick_of_bar, Key, Tick, TICKS_PER_BEAT};

#[cfg(test)]
mod tests;

/// Structural phase of a modulation. Non-decreasing along the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Establish,
    Develop,
    Resolve,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Establish => "establish",
            Phase::Develop => "develop",
            Phase::Resolve => "resolve",
        }
    }
}

/// One modulation: from `tick` onward the music is in `key`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Modulation {
    pub tick: Tick,
    pub key: Key,
    pub phase: Phase,
}

/// Home key plus the ordered modulation schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TonalPlan {
    pub home: Key,
    pub modulations: Vec<Modulation>,
}

impl TonalPlan {
    /// Key in effect at a tick.
    pub fn key_at_tick(&self, tick: Tick) -> Key {
        self.modulations
            .iter()
            .rev()
            .find(|m| m.tick <= tick)
            .map(|m| m.key)
            .unwrap_or(self.home)
    }

    /// Keys in order of appearance, consecutive duplicates removed.
    pub fn key_sequence(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = Vec::new();
        for m in &self.modulations {
            if keys.last() != Some(&m.key) {
                keys.push(m.key);
            }
        }
        keys
    }

    /// Expand into a beat-resolution harmonic timeline over
    /// `[0, total_ticks)`.
    ///
    /// The span is split into key regions at each modulation; each
    /// region is filled with one chord per beat, alternating between
    /// the circle-of-fifths and descending-fifths progressions on
    /// alternating regions.
    pub fn to_detailed_timeline(&self, total_ticks: Tick) -> HarmonicTimeline {
        let mut timeline = HarmonicTimeline::new();
        if total_ticks == 0 {
            return timeline;
        }

        // Region boundaries: 0, every modulation tick, total_ticks.
        let mut boundaries: Vec<(Tick, Key)> = vec![(0, self.key_at_tick(0))];
        for m in &self.modulations {
            if m.tick > 0 && m.tick < total_ticks {
                match boundaries.last() {
                    Some(&(t, _)) if t == m.tick => {
                        boundaries.last_mut().unwrap().1 = m.key;
                    }
                    _ => boundaries.push((m.tick, m.key)),
                }
            }
        }

        for (region_idx, window) in boundaries.windows(2).enumerate() {
            let (start, key) = window[0];
            let (end, _) = window[1];
            fill_region(&mut timeline, start, end, key, region_idx);
        }
        if let Some(&(last_start, last_key)) = boundaries.last() {
            fill_region(
                &mut timeline,
                last_start,
                total_ticks,
                last_key,
                boundaries.len() - 1,
            );
        }
        timeline
    }
}

/// Degree cycle walking the circle of fifths upward from the tonic.
const CIRCLE_OF_FIFTHS: [ChordDegree; 8] = [
    ChordDegree::I,
    ChordDegree::IV,
    ChordDegree::VII,
    ChordDegree::III,
    ChordDegree::VI,
    ChordDegree::II,
    ChordDegree::V,
    ChordDegree::I,
];

/// Root motion by descending fifths.
const DESCENDING_FIFTHS: [ChordDegree; 8] = [
    ChordDegree::I,
    ChordDegree::V,
    ChordDegree::II,
    ChordDegree::VI,
    ChordDegree::III,
    ChordDegree::VII,
    ChordDegree::IV,
    ChordDegree::I,
];

fn fill_region(
    timeline: &mut HarmonicTimeline,
    start: Tick,
    end: Tick,
    key: Key,
    region_idx: usize,
) {
    if end <= start {
        return;
    }
    let template: &[ChordDegree] = if region_idx % 2 == 0 {
        &CIRCLE_OF_FIFTHS
    } else {
        &DESCENDING_FIFTHS
    };
    let beats = (end - start) / TICKS_PER_BEAT;
    for beat in 0..beats {
        let degree = template[(beat as usize) % template.len()];
        let tick = start + beat * TICKS_PER_BEAT;
        let event = HarmonicEvent::new(
            tick,
            tick + TICKS_PER_BEAT,
            key,
            Chord::diatonic(degree, key),
        );
        // Construction is in tick order, so push cannot fail.
        timeline
            .push(event)
            .expect("region fill emits sorted events");
    }
    // Cover a trailing partial beat so lookups never fall in a gap.
    let covered = start + beats * TICKS_PER_BEAT;
    if covered < end {
        timeline
            .push(HarmonicEvent::new(
                covered,
                end,
                key,
                Chord::diatonic(ChordDegree::I, key),
            ))
            .expect("tail event is sorted");
    }
}

/// Generate the modulation schedule for a piece of `total_ticks`.
///
/// The piece is partitioned into three roughly equal phases snapped to
/// bar boundaries (minimum one bar each): a home anchor at tick 0, a
/// Develop phase walking closely related keys, and a Resolve return to
/// the home key. An empty span yields an empty plan.
pub fn generate_tonal_plan(key: Key, total_ticks: Tick, rng: &mut Pcg32) -> TonalPlan {
    let mut plan = TonalPlan {
        home: key,
        modulations: Vec::new(),
    };
    let total_bars = bar_of(total_ticks);
    if total_ticks == 0 || total_bars == 0 {
        return plan;
    }

    plan.modulations.push(Modulation {
        tick: 0,
        key,
        phase: Phase::Establish,
    });

    if total_bars < 3 {
        return plan;
    }

    let phase_bars = (total_bars / 3).max(1);
    let develop_start_bar = phase_bars;
    let resolve_start_bar = (2 * phase_bars).min(total_bars - 1);

    // Closely related keys, order by mode.
    let related: [Key; 3] = if key.minor {
        [key.relative(), key.dominant_key(), key.subdominant_key()]
    } else {
        [key.dominant_key(), key.relative(), key.subdominant_key()]
    };
    let develop_bars = resolve_start_bar - develop_start_bar;
    let count = match develop_bars {
        0 => 0,
        1..=3 => 1,
        4..=7 => 2,
        _ => 3,
    };
    let count = count.min(related.len() as u64);

    // Occasionally swap the first two targets for variety.
    let mut targets: Vec<Key> = related[..count as usize].to_vec();
    if targets.len() >= 2 && rng.gen_bool(0.3) {
        targets.swap(0, 1);
    }

    // Even distribution within Develop, snapped to bars.
    for (i, target) in targets.iter().enumerate() {
        let offset = develop_bars * i as u64 / count.max(1);
        let bar = develop_start_bar + offset;
        plan.modulations.push(Modulation {
            tick: tick_of_bar(bar),
            key: *target,
            phase: Phase::Develop,
        });
    }

    plan.modulations.push(Modulation {
        tick: tick_of_bar(resolve_start_bar),
        key,
        phase: Phase::Resolve,
    });

    debug_assert!(plan
        .modulations
        .windows(2)
        .all(|w| w[0].phase <= w[1].phase && w[0].tick <= w[1].tick));
    plan
}

//! Tests for tonal planning.

use pretty_assertions::assert_eq;

use crate::rng::rng_for;
use crate::types::{Key, TICKS_PER_BAR, TICKS_PER_BEAT};

use super::*;

#[test]
fn empty_span_yields_empty_plan() {
    let mut rng = rng_for(1, "tonal");
    let plan = generate_tonal_plan(Key::new(0, false), 0, &mut rng);
    assert!(plan.modulations.is_empty());
    assert!(plan.to_detailed_timeline(0).is_empty());
}

#[test]
fn phases_are_non_decreasing_and_resolve_returns_home() {
    let home = Key::new(7, false);
    for seed in [1u32, 42, 999] {
        let mut rng = rng_for(seed, "tonal");
        let plan = generate_tonal_plan(home, 24 * TICKS_PER_BAR, &mut rng);
        assert!(!plan.modulations.is_empty());
        assert_eq!(plan.modulations[0].phase, Phase::Establish);
        assert_eq!(plan.modulations[0].tick, 0);
        for pair in plan.modulations.windows(2) {
            assert!(pair[0].phase <= pair[1].phase);
            assert!(pair[0].tick <= pair[1].tick);
        }
        let last = plan.modulations.last().unwrap();
        assert_eq!(last.phase, Phase::Resolve);
        assert_eq!(last.key, home);
    }
}

#[test]
fn modulation_ticks_snap_to_bars() {
    let mut rng = rng_for(42, "tonal");
    let plan = generate_tonal_plan(Key::new(2, true), 18 * TICKS_PER_BAR, &mut rng);
    for m in &plan.modulations {
        assert_eq!(m.tick % TICKS_PER_BAR, 0);
    }
}

#[test]
fn key_at_tick_follows_schedule() {
    let mut rng = rng_for(42, "tonal");
    let home = Key::new(0, false);
    let plan = generate_tonal_plan(home, 24 * TICKS_PER_BAR, &mut rng);
    assert_eq!(plan.key_at_tick(0), home);
    let last = plan.modulations.last().unwrap();
    assert_eq!(plan.key_at_tick(last.tick + 1), home);
    // Somewhere in Develop the key differs from home.
    let develop = plan
        .modulations
        .iter()
        .find(|m| m.phase == Phase::Develop)
        .expect("develop modulation");
    assert_ne!(plan.key_at_tick(develop.tick), home);
}

#[test]
fn detailed_timeline_covers_the_whole_span_at_beat_resolution() {
    let mut rng = rng_for(7, "tonal");
    let total = 12 * TICKS_PER_BAR;
    let plan = generate_tonal_plan(Key::new(9, true), total, &mut rng);
    let timeline = plan.to_detailed_timeline(total);
    assert_eq!(timeline.end_tick(), total);
    for tick in (0..total).step_by(TICKS_PER_BEAT as usize) {
        assert!(timeline.find_at(tick).is_some(), "gap at {}", tick);
    }
    // Events are beat-aligned and non-overlapping by construction.
    for pair in timeline.events().windows(2) {
        assert!(pair[0].end_tick <= pair[1].tick);
    }
}

#[test]
fn key_sequence_deduplicates() {
    let home = Key::new(0, false);
    let plan = TonalPlan {
        home,
        modulations: vec![
            Modulation { tick: 0, key: home, phase: Phase::Establish },
            Modulation { tick: 1920, key: home, phase: Phase::Develop },
            Modulation { tick: 3840, key: home.dominant_key(), phase: Phase::Develop },
            Modulation { tick: 5760, key: home, phase: Phase::Resolve },
        ],
    };
    let seq = plan.key_sequence();
    assert_eq!(seq, vec![home, home.dominant_key(), home]);
}

//! Tests for the structural planners.

use pretty_assertions::assert_eq;

use crate::harmony::CadenceType;
use crate::tonal::Phase;
use crate::types::{Key, TICKS_PER_BAR, TICKS_PER_BEAT};

use super::*;

fn section(kind: SectionKind, phase: Phase, start_bar: u64, end_bar: u64) -> Section {
    Section {
        kind,
        phase,
        start_tick: start_bar * TICKS_PER_BAR,
        end_tick: end_bar * TICKS_PER_BAR,
        key: Key::new(0, false),
    }
}

#[test]
fn fugue_structure_must_open_with_exposition() {
    let mut s = FugueStructure::new();
    let err = s.add_section(section(SectionKind::Episode, Phase::Establish, 0, 4));
    assert_eq!(err, Err(StructureError::BadOpening));
    assert!(s.is_empty());

    s.add_section(section(SectionKind::Exposition, Phase::Establish, 0, 4))
        .unwrap();
    assert_eq!(s.sections().len(), 1);
}

#[test]
fn fugue_structure_rejects_phase_regression_without_mutating() {
    let mut s = FugueStructure::new();
    s.add_section(section(SectionKind::Exposition, Phase::Establish, 0, 4))
        .unwrap();
    s.add_section(section(SectionKind::Episode, Phase::Develop, 4, 8))
        .unwrap();
    let err = s.add_section(section(SectionKind::Episode, Phase::Establish, 8, 12));
    assert!(matches!(err, Err(StructureError::PhaseRegression { .. })));
    assert_eq!(s.sections().len(), 2);
}

#[test]
fn fugue_structure_rejects_overlap_and_empty() {
    let mut s = FugueStructure::new();
    s.add_section(section(SectionKind::Exposition, Phase::Establish, 0, 4))
        .unwrap();
    let overlap = s.add_section(section(SectionKind::Episode, Phase::Develop, 3, 6));
    assert!(matches!(overlap, Err(StructureError::Overlap { .. })));
    let empty = s.add_section(section(SectionKind::Episode, Phase::Develop, 6, 6));
    assert!(matches!(empty, Err(StructureError::EmptyInterval { .. })));
}

#[test]
fn subject_entry_sections_are_flagged() {
    let mut s = FugueStructure::new();
    s.add_section(section(SectionKind::Exposition, Phase::Establish, 0, 4))
        .unwrap();
    s.add_section(section(SectionKind::Episode, Phase::Develop, 4, 8))
        .unwrap();
    s.add_section(section(SectionKind::MiddleEntry, Phase::Develop, 8, 10))
        .unwrap();
    assert!(s.in_subject_entry_section(0));
    assert!(!s.in_subject_entry_section(5 * TICKS_PER_BAR));
    assert!(s.in_subject_entry_section(9 * TICKS_PER_BAR));
    assert!(!s.in_subject_entry_section(20 * TICKS_PER_BAR));
}

#[test]
fn standard_scheme_has_seven_entries_in_the_documented_order() {
    use crate::harmony::{ChordDegree, ChordQuality};
    let scheme = ChaconneScheme::standard_minor();
    let degrees: Vec<_> = scheme.entries().iter().map(|e| e.degree).collect();
    assert_eq!(
        degrees,
        vec![
            ChordDegree::I,
            ChordDegree::V,
            ChordDegree::I,
            ChordDegree::IV,
            ChordDegree::FlatVII,
            ChordDegree::III,
            ChordDegree::V,
        ]
    );
    assert_eq!(scheme.entries()[0].quality, ChordQuality::Minor);
    assert_eq!(scheme.cycle_beats(), 8);
}

#[test]
fn scheme_round_trip_integrity() {
    let scheme = ChaconneScheme::standard_minor();
    let key = Key::new(2, true);
    for cycles in [1u64, 2, 4] {
        let total = cycles * scheme.cycle_beats() as u64 * TICKS_PER_BEAT;
        let timeline = scheme.to_timeline(key, total);
        let report = scheme.verify_integrity(&timeline);
        assert!(report.passed(), "critical: {:?}", report.critical);
        assert_eq!(scheme.integrity_score(&timeline), 1.0);
    }
}

#[test]
fn scheme_integrity_catches_degree_mismatch() {
    let scheme = ChaconneScheme::standard_minor();
    let key = Key::new(2, true);
    let total = scheme.cycle_beats() as u64 * TICKS_PER_BEAT;
    let timeline = ChaconneScheme::new(
        scheme
            .entries()
            .iter()
            .map(|e| SchemeEntry {
                degree: crate::harmony::ChordDegree::I,
                ..*e
            })
            .collect(),
    )
    .to_timeline(key, total);
    let report = scheme.verify_integrity(&timeline);
    assert!(!report.passed());
    assert!(scheme.integrity_score(&timeline) < 1.0);
}

#[test]
fn standard_variation_plan_is_valid() {
    let plan = create_standard_variation_plan(Key::new(2, true));
    assert_eq!(plan.variations.len(), 10);
    validate_variation_plan(&plan).unwrap();
    // Illuminate borrowed the parallel major.
    let illuminate = plan
        .variations
        .iter()
        .find(|v| v.role == VariationRole::Illuminate)
        .unwrap();
    assert!(!illuminate.key.minor);
    assert_eq!(illuminate.key.tonic, 2);
}

#[test]
fn destabilize_may_follow_illuminate_but_nothing_else_regresses() {
    let mut plan = create_standard_variation_plan(Key::new(2, true));
    validate_variation_plan(&plan).unwrap();
    // Moving Establish after Develop breaks the order.
    plan.variations.swap(0, 1);
    assert!(matches!(
        validate_variation_plan(&plan),
        Err(PlanError::RoleOrder { .. })
    ));
}

#[test]
fn accumulate_count_is_enforced() {
    let mut plan = create_standard_variation_plan(Key::new(0, true));
    plan.variations.remove(6);
    assert_eq!(
        validate_variation_plan(&plan),
        Err(PlanError::AccumulateCount { found: 2 })
    );
}

#[test]
fn final_variation_must_be_resolve_theme() {
    let mut plan = create_standard_variation_plan(Key::new(0, true));
    plan.variations.last_mut().unwrap().allowed = vec![VariationType::Virtuosic];
    assert!(matches!(
        validate_variation_plan(&plan),
        Err(PlanError::BadFinal) | Err(PlanError::IncompatibleTypes { .. })
    ));
}

#[test]
fn goldberg_grid_shape() {
    let grid = GoldbergGrid::standard();
    assert_eq!(grid.bars.len(), GOLDBERG_BARS);
    for bar in &grid.bars {
        assert!((1..=4).contains(&bar.phrase_position));
    }
    assert_eq!(grid.bars[7].cadence, Some(CadenceType::Half));
    assert_eq!(grid.bars[31].cadence, Some(CadenceType::Perfect));
    assert_eq!(grid.bars.iter().filter(|b| b.cadence.is_some()).count(), 4);
}

//! Chaconne ground scheme and variation plan.

use serde::Serialize;
use thiserror::Error;

use crate::harmony::{Chord, ChordDegree, ChordQuality, HarmonicEvent, HarmonicTimeline};
use crate::types::{Key, Tick, TICKS_PER_BEAT};

/// One entry of the abstract ground progression, key-independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SchemeEntry {
    pub degree: ChordDegree,
    pub quality: ChordQuality,
    pub preferred_inversion: u8,
    /// Metric salience 0.0-1.0.
    pub weight: f64,
    pub position_beats: u32,
    pub duration_beats: u32,
}

/// Immutable ordered ground progression.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaconneScheme {
    entries: Vec<SchemeEntry>,
}

/// Integrity report: critical failures invalidate the variation, plain
/// warnings do not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeFailReport {
    pub critical: Vec<String>,
    pub warnings: Vec<String>,
}

impl SchemeFailReport {
    pub fn passed(&self) -> bool {
        self.critical.is_empty()
    }
}

impl ChaconneScheme {
    pub fn new(entries: Vec<SchemeEntry>) -> ChaconneScheme {
        ChaconneScheme { entries }
    }

    /// The standard minor-mode ground: i, V, i, iv, bVII, III, V over
    /// eight beats, the dominant held for the final two.
    ///
    /// III and bVII are natural-minor degrees here regardless of the
    /// harmonic-minor scale used for melodic lookups.
    pub fn standard_minor() -> ChaconneScheme {
        let entry = |degree, quality, position_beats, duration_beats, weight| SchemeEntry {
            degree,
            quality,
            preferred_inversion: 0,
            weight,
            position_beats,
            duration_beats,
        };
        ChaconneScheme::new(vec![
            entry(ChordDegree::I, ChordQuality::Minor, 0, 1, 1.0),
            entry(ChordDegree::V, ChordQuality::Major, 1, 1, 0.5),
            entry(ChordDegree::I, ChordQuality::Minor, 2, 1, 0.75),
            entry(ChordDegree::IV, ChordQuality::Minor, 3, 1, 0.5),
            entry(ChordDegree::FlatVII, ChordQuality::Major, 4, 1, 1.0),
            entry(ChordDegree::III, ChordQuality::Major, 5, 1, 0.5),
            entry(ChordDegree::V, ChordQuality::Major, 6, 2, 0.75),
        ])
    }

    pub fn entries(&self) -> &[SchemeEntry] {
        &self.entries
    }

    /// Length of one cycle in beats.
    pub fn cycle_beats(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.position_beats + e.duration_beats)
            .max()
            .unwrap_or(0)
    }

    /// Realize the scheme as a harmonic timeline over `[0, total_ticks)`,
    /// repeating the cycle as needed. A partial trailing cycle is
    /// truncated at entry granularity.
    pub fn to_timeline(&self, key: Key, total_ticks: Tick) -> HarmonicTimeline {
        let mut timeline = HarmonicTimeline::new();
        let cycle_ticks = self.cycle_beats() as Tick * TICKS_PER_BEAT;
        if cycle_ticks == 0 || total_ticks == 0 {
            return timeline;
        }
        let mut cycle_start: Tick = 0;
        while cycle_start < total_ticks {
            for entry in &self.entries {
                let tick = cycle_start + entry.position_beats as Tick * TICKS_PER_BEAT;
                let end = tick + entry.duration_beats as Tick * TICKS_PER_BEAT;
                if end > total_ticks {
                    return timeline;
                }
                let chord = Chord::from_degree(entry.degree, entry.quality, key)
                    .with_inversion(entry.preferred_inversion);
                let mut event = HarmonicEvent::new(tick, end, key, chord);
                event.weight = entry.weight;
                event.is_immutable = true;
                timeline.push(event).expect("scheme events are sorted");
            }
            cycle_start += cycle_ticks;
        }
        timeline
    }

    /// Verify a generated timeline against the scheme: event count must
    /// be a whole number of cycles and every event must match its
    /// entry's degree and quality.
    pub fn verify_integrity(&self, timeline: &HarmonicTimeline) -> SchemeFailReport {
        let mut report = SchemeFailReport::default();
        let n = self.entries.len();
        if n == 0 {
            report.critical.push("scheme has no entries".to_string());
            return report;
        }
        let events = timeline.events();
        if events.is_empty() {
            report.critical.push("timeline has no events".to_string());
            return report;
        }
        if events.len() % n != 0 {
            report.critical.push(format!(
                "event count {} is not a whole number of {}-entry cycles",
                events.len(),
                n
            ));
            return report;
        }
        for (i, event) in events.iter().enumerate() {
            let entry = &self.entries[i % n];
            if event.chord.degree != entry.degree {
                report.critical.push(format!(
                    "event {} degree {:?} does not match scheme degree {:?}",
                    i, event.chord.degree, entry.degree
                ));
            }
            if event.chord.quality != entry.quality {
                report.critical.push(format!(
                    "event {} quality {:?} does not match scheme quality {:?}",
                    i, event.chord.quality, entry.quality
                ));
            }
            if event.chord.inversion != entry.preferred_inversion {
                report.warnings.push(format!(
                    "event {} inversion {} differs from preferred {}",
                    i, event.chord.inversion, entry.preferred_inversion
                ));
            }
        }
        report
    }

    /// Fraction of timeline events matching the scheme (1.0 = perfect).
    pub fn integrity_score(&self, timeline: &HarmonicTimeline) -> f64 {
        let n = self.entries.len();
        let events = timeline.events();
        if n == 0 || events.is_empty() {
            return 0.0;
        }
        let matching = events
            .iter()
            .enumerate()
            .filter(|(i, e)| {
                let entry = &self.entries[i % n];
                e.chord.degree == entry.degree && e.chord.quality == entry.quality
            })
            .count();
        matching as f64 / events.len() as f64
    }
}

/// Structural function of one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationRole {
    Establish,
    Develop,
    Destabilize,
    Illuminate,
    Accumulate,
    Resolve,
}

impl VariationRole {
    /// Position in the canonical role order.
    fn rank(&self) -> u8 {
        match self {
            VariationRole::Establish => 0,
            VariationRole::Develop => 1,
            VariationRole::Destabilize => 2,
            VariationRole::Illuminate => 3,
            VariationRole::Accumulate => 4,
            VariationRole::Resolve => 5,
        }
    }

    /// Texture types this role admits.
    pub fn compatible_types(&self) -> &'static [VariationType] {
        match self {
            VariationRole::Establish => &[VariationType::Theme],
            VariationRole::Develop => &[VariationType::Flowing, VariationType::Cantabile],
            VariationRole::Destabilize => &[VariationType::Perpetuum, VariationType::Virtuosic],
            VariationRole::Illuminate => &[VariationType::Cantabile, VariationType::Chordal],
            VariationRole::Accumulate => &[VariationType::Virtuosic, VariationType::Chordal],
            VariationRole::Resolve => &[VariationType::Theme],
        }
    }
}

/// Texture class of one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationType {
    Theme,
    Flowing,
    Cantabile,
    Chordal,
    Virtuosic,
    Perpetuum,
}

/// One planned variation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variation {
    pub role: VariationRole,
    /// Key of this variation (Illuminate uses the parallel major).
    pub key: Key,
    /// Types the generator may choose from for this variation.
    pub allowed: Vec<VariationType>,
}

/// The ordered variation plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariationPlan {
    pub home: Key,
    pub variations: Vec<Variation>,
}

/// Validation errors for a variation plan.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("variation plan is empty")]
    Empty,

    #[error("role order violated at variation {index}")]
    RoleOrder { index: usize },

    #[error("expected exactly 3 Accumulate variations, found {found}")]
    AccumulateCount { found: usize },

    #[error("last variation must be Resolve with the Theme type")]
    BadFinal,

    #[error("variation {index} allows types incompatible with its role")]
    IncompatibleTypes { index: usize },
}

/// The fixed standard plan: Establish, Develop x2, Destabilize,
/// Illuminate, Destabilize, Accumulate x3, Resolve (10 variations).
pub fn create_standard_variation_plan(home: Key) -> VariationPlan {
    let plain = |role: VariationRole| Variation {
        role,
        key: home,
        allowed: role.compatible_types().to_vec(),
    };
    let illuminate = Variation {
        role: VariationRole::Illuminate,
        // Major sections use the parallel major.
        key: if home.minor { home.parallel() } else { home },
        allowed: VariationRole::Illuminate.compatible_types().to_vec(),
    };
    VariationPlan {
        home,
        variations: vec![
            plain(VariationRole::Establish),
            plain(VariationRole::Develop),
            plain(VariationRole::Develop),
            plain(VariationRole::Destabilize),
            illuminate,
            plain(VariationRole::Destabilize),
            plain(VariationRole::Accumulate),
            plain(VariationRole::Accumulate),
            plain(VariationRole::Accumulate),
            Variation {
                role: VariationRole::Resolve,
                key: home,
                allowed: vec![VariationType::Theme],
            },
        ],
    }
}

/// Validate role order (monotonic, with the single exception that
/// Destabilize may follow Illuminate), Accumulate count, final
/// variation, and per-variation type compatibility.
pub fn validate_variation_plan(plan: &VariationPlan) -> Result<(), PlanError> {
    if plan.variations.is_empty() {
        return Err(PlanError::Empty);
    }
    for (index, pair) in plan.variations.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let regression = next.role.rank() < prev.role.rank();
        let allowed_exception = prev.role == VariationRole::Illuminate
            && next.role == VariationRole::Destabilize;
        if regression && !allowed_exception {
            return Err(PlanError::RoleOrder { index: index + 1 });
        }
    }
    let accumulate = plan
        .variations
        .iter()
        .filter(|v| v.role == VariationRole::Accumulate)
        .count();
    if accumulate != 3 {
        return Err(PlanError::AccumulateCount { found: accumulate });
    }
    let last = plan.variations.last().unwrap();
    if last.role != VariationRole::Resolve || last.allowed != vec![VariationType::Theme] {
        return Err(PlanError::BadFinal);
    }
    for (index, variation) in plan.variations.iter().enumerate() {
        if variation.allowed.is_empty() {
            return Err(PlanError::IncompatibleTypes { index });
        }
        let compatible = variation.role.compatible_types();
        if variation.allowed.iter().any(|t| !compatible.contains(t)) {
            return Err(PlanError::IncompatibleTypes { index });
        }
    }
    Ok(())
}

//! Read-only quality metrics over a finished score.
//!
//! Nothing here mutates; the report is advisory and feeds the CLI's
//! analyze command.

use serde::Serialize;

use crate::forms::Score;
use crate::harmony::HarmonicTimeline;
use crate::structure::ChaconneScheme;
use crate::types::{bar_of, Tick, TICKS_PER_BEAT};

/// Advisory metrics for one generated score.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub note_count: usize,
    /// Same-voice overlaps beyond the 1-tick rounding tolerance.
    pub overlap_violations: usize,
    /// Fraction of notes touched by a repair pass.
    pub repaired_fraction: f64,
    /// Longest stretch without a planned cadence, in bars.
    pub widest_cadence_gap_bars: u64,
    /// Guard warnings carried through from generation.
    pub warning_count: usize,
}

/// Count same-voice overlaps that exceed the rounding tolerance.
fn overlap_violations(score: &Score) -> usize {
    let mut violations = 0;
    for track in &score.tracks {
        for pair in track.notes.windows(2) {
            let end = pair[0].start_tick + pair[0].duration;
            if end > pair[1].start_tick + 1 {
                violations += 1;
            }
        }
    }
    violations
}

/// Widest span between consecutive planned cadences, in bars.
fn widest_cadence_gap(score: &Score) -> u64 {
    let end: Tick = score
        .tracks
        .iter()
        .flat_map(|t| t.notes.iter())
        .map(|n| n.start_tick + n.duration)
        .max()
        .unwrap_or(0);
    let mut boundaries: Vec<Tick> = vec![0];
    boundaries.extend(score.cadences.iter().map(|c| c.tick));
    boundaries.push(end);
    boundaries.sort_unstable();
    boundaries
        .windows(2)
        .map(|w| bar_of(w[1].saturating_sub(w[0])))
        .max()
        .unwrap_or(0)
}

/// Build the advisory report for a score.
pub fn analyze(score: &Score) -> AnalysisReport {
    let note_count = score.note_count();
    let repaired = score
        .tracks
        .iter()
        .flat_map(|t| t.notes.iter())
        .filter(|n| !n.modified_by.is_empty())
        .count();
    AnalysisReport {
        note_count,
        overlap_violations: overlap_violations(score),
        repaired_fraction: if note_count == 0 {
            0.0
        } else {
            repaired as f64 / note_count as f64
        },
        widest_cadence_gap_bars: widest_cadence_gap(score),
        warning_count: score.warnings.len(),
    }
}

/// Ground integrity of a cyclic form, 1.0 when every timeline event
/// matches its scheme entry.
pub fn ground_integrity(scheme: &ChaconneScheme, timeline: &HarmonicTimeline) -> f64 {
    scheme.integrity_score(timeline)
}

/// Mean onset density in notes per beat, for density comparisons
/// between sections.
pub fn onset_density(score: &Score, start: Tick, end: Tick) -> f64 {
    if end <= start {
        return 0.0;
    }
    let onsets = score
        .tracks
        .iter()
        .flat_map(|t| t.notes.iter())
        .filter(|n| n.start_tick >= start && n.start_tick < end)
        .count();
    let beats = (end - start) as f64 / TICKS_PER_BEAT as f64;
    onsets as f64 / beats
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use fugata_spec::{ChaconneConfig, FormConfig, ScoreSpec};

    use crate::forms::generate;
    use crate::structure::ChaconneScheme;
    use crate::types::Key;

    use super::*;

    fn chaconne_score() -> Score {
        let request = ScoreSpec {
            name: "analysis".to_string(),
            seed: 17,
            config: FormConfig::Chaconne(ChaconneConfig::default()),
        };
        generate(&request).unwrap()
    }

    #[test]
    fn finished_scores_carry_no_hard_overlaps() {
        let report = analyze(&chaconne_score());
        assert_eq!(report.overlap_violations, 0);
        assert!(report.note_count > 0);
    }

    #[test]
    fn standard_scheme_scores_perfect_on_its_own_timeline() {
        let scheme = ChaconneScheme::standard_minor();
        let key = Key::new(2, true);
        let timeline = scheme.to_timeline(key, 8 * TICKS_PER_BEAT);
        let score = ground_integrity(&scheme, &timeline);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cadence_gap_is_counted_in_whole_bars() {
        let score = chaconne_score();
        let report = analyze(&score);
        let end: Tick = score
            .tracks
            .iter()
            .flat_map(|t| t.notes.iter())
            .map(|n| n.start_tick + n.duration)
            .max()
            .unwrap();
        let total_bars: u64 = bar_of(end) + 1;
        assert!(report.widest_cadence_gap_bars >= 1);
        assert!(report.widest_cadence_gap_bars <= total_bars);
    }

    #[test]
    fn empty_span_has_zero_density() {
        let score = chaconne_score();
        assert_eq!(onset_density(&score, 100, 100), 0.0);
    }
}
